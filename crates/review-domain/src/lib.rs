// review-domain library entry point
pub mod error;
pub mod figure;
pub mod filter;
pub mod runtime;
pub mod table;
pub use error::DomainError;
pub use figure::ChartFigure;
pub use filter::{parse_filter, CmpOp, FilterExpr, Literal};
pub use runtime::{default_runtime, runtime_with_colors};
pub use table::Table;
