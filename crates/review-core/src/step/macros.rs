//! Macro utilitaria para reducir el boilerplate de `Step`.
//!
//! Exportada en la raíz del crate:
//!   use review_core::impl_step;
//!
//! Requisitos sobre el tipo: campos `id: String` y `config: <Cfg>`, y un
//! constructor `fn with_id(id: String, config: Cfg) -> Self`. El contrato de
//! campos (`FieldContract`) y el de resultados (`ResultContract`) se
//! implementan a mano.
//!
//! Formas soportadas:
//! - impl_step!(Ty { name: "..", module: "..", config: Cfg, roles: [preprocessor] });
//! - impl_step!(Ty { name: "..", module: "..", config: Cfg, roles: [analyser], results: contract });

#[macro_export]
macro_rules! impl_step {
    (@role preprocessor) => {
        fn as_preprocessor(&self) -> Option<&dyn $crate::step::Preprocessor> { Some(self) }
    };
    (@role embedder) => {
        fn as_embedder(&mut self) -> Option<&mut dyn $crate::step::Embedder> { Some(self) }
    };
    (@role analyser) => {
        fn as_analyser(&self) -> Option<&dyn $crate::step::Analyser> { Some(self) }
    };
    (@role predictor) => {
        fn as_predictor(&mut self) -> Option<&mut dyn $crate::step::Predictor> { Some(self) }
    };
    (@role evaluator) => {
        fn as_evaluator(&self) -> Option<&dyn $crate::step::Evaluator> { Some(self) }
    };
    (@role visualizer) => {
        fn as_visualizer(&self) -> Option<&dyn $crate::step::Visualizer> { Some(self) }
    };
    (@results contract) => {
        fn result_contract(&self) -> Option<&dyn $crate::step::ResultContract> { Some(self) }
    };

    (
        $ty:ident {
            name: $name:expr,
            module: $module:expr,
            config: $cfg:ty,
            roles: [$($role:ident),* $(,)?]
            $(, results: $res:ident)?
            $(,)?
        }
    ) => {
        impl $crate::step::Step for $ty {
            fn id(&self) -> &str { &self.id }
            fn name(&self) -> &str { $name }
            fn module(&self) -> &str { $module }
            fn classname(&self) -> &str { stringify!($ty) }
            fn config(&self) -> Result<$crate::serde_json::Map<String, $crate::serde_json::Value>, $crate::errors::CoreEngineError> {
                $crate::step::Config::to_dict(&self.config)
            }
            fn update_config(&mut self, values: &$crate::serde_json::Map<String, $crate::serde_json::Value>) -> Result<(), $crate::errors::CoreEngineError> {
                $crate::step::Config::update(&mut self.config, values)
            }
            $( $crate::impl_step!(@role $role); )*
            $( $crate::impl_step!(@results $res); )?
        }

        impl $crate::registry::StepClass for $ty {
            const MODULE: &'static str = $module;
            const CLASSNAME: &'static str = stringify!($ty);

            fn build(id: String, config: &$crate::serde_json::Map<String, $crate::serde_json::Value>) -> Result<Box<dyn $crate::step::Step>, $crate::errors::CoreEngineError> {
                let mut step = <$ty>::with_id(id, <$cfg as Default>::default());
                $crate::step::Config::update(&mut step.config, config)?;
                Ok(Box::new(step))
            }
        }
    };
}
