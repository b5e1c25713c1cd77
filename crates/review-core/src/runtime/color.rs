//! Colormap lineal y paleta determinista.
use std::fmt;

use crate::errors::CoreEngineError;

/// Color RGB de 8 bits por canal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parsea `#RRGGBB` (el `#` es opcional).
    pub fn parse_hex(s: &str) -> Result<Self, CoreEngineError> {
        let raw = s.trim().trim_start_matches('#');
        let bad = || CoreEngineError::InvalidConfig { key: "colors".into(),
                                                      reason: format!("'{s}' is not a #RRGGBB color") };
        if raw.len() != 6 || !raw.is_ascii() {
            return Err(bad());
        }
        let channel = |i: usize| u8::from_str_radix(&raw[i..i + 2], 16).map_err(|_| bad());
        Ok(Self { r: channel(0)?,
                  g: channel(2)?,
                  b: channel(4)? })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Interpolación lineal sobre paradas equiespaciadas en `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    stops: Vec<Rgb>,
}

impl Colormap {
    pub fn from_hex<S: AsRef<str>>(colors: &[S]) -> Result<Self, CoreEngineError> {
        if colors.is_empty() {
            return Err(CoreEngineError::InvalidConfig { key: "colors".into(),
                                                        reason: "at least one color is required".into() });
        }
        let stops = colors.iter().map(|c| Rgb::parse_hex(c.as_ref())).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { stops })
    }

    pub fn single(color: Rgb) -> Self {
        Self { stops: vec![color] }
    }

    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    /// Color en la posición `t` (se recorta a `[0, 1]`).
    pub fn sample(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if self.stops.len() == 1 {
            return self.stops[0];
        }
        let segments = (self.stops.len() - 1) as f64;
        let scaled = t * segments;
        let idx = (scaled.floor() as usize).min(self.stops.len() - 2);
        let local = scaled - idx as f64;
        let (a, b) = (self.stops[idx], self.stops[idx + 1]);
        // Truncado como en la conversión float -> byte habitual (int(x * 255)).
        let mix = |x: u8, y: u8| {
            let v = (x as f64 / 255.0) * (1.0 - local) + (y as f64 / 255.0) * local;
            (v * 255.0).clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
    }

    pub fn hex(&self, t: f64) -> String {
        self.sample(t).to_hex()
    }
}

/// Secuencia infinita de colores.
///
/// La ronda 0 recorre las posiciones `0, 1, s, 1-s, 2s, 1-2s, ...` mientras
/// permanezcan en `[0, 1]`; la ronda `k >= 1` repite el recorrido desplazado
/// en `s/(k+1)`.
#[derive(Debug, Clone)]
pub struct Palette {
    colormap: Colormap,
    step: f64,
    round: usize,
    j: usize,
    upper: bool,
}

impl Palette {
    pub fn new(colormap: Colormap, step: f64) -> Self {
        Self { colormap,
               step,
               round: 0,
               j: 0,
               upper: false }
    }

    fn offset(&self) -> f64 {
        if self.round == 0 {
            0.0
        } else {
            self.step / (self.round as f64 + 1.0)
        }
    }

    /// Siguiente posición en `[0, 1]` a muestrear.
    fn next_position(&mut self) -> f64 {
        const EPS: f64 = 1e-9;
        loop {
            let lo = self.offset() + self.step * self.j as f64;
            if lo > 1.0 + EPS {
                self.round += 1;
                self.j = 0;
                self.upper = false;
                continue;
            }
            if self.upper {
                self.upper = false;
                self.j += 1;
                return (1.0 - lo).max(0.0);
            }
            self.upper = true;
            return lo.min(1.0);
        }
    }
}

impl Iterator for Palette {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let t = self.next_position();
        Some(self.colormap.hex(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bw() -> Colormap {
        Colormap::from_hex(&["#000000", "#FFFFFF"]).unwrap()
    }

    #[test]
    fn colormap_endpoints_and_midpoint() {
        let cm = bw();
        assert_eq!(cm.hex(0.0), "#000000");
        assert_eq!(cm.hex(1.0), "#FFFFFF");
        assert_eq!(cm.hex(0.5), "#7F7F7F");
        assert_eq!(cm.hex(7.0), "#FFFFFF");
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert!(Rgb::parse_hex("#12345").is_err());
        assert!(Rgb::parse_hex("#GG0000").is_err());
        assert!(Colormap::from_hex::<&str>(&[]).is_err());
        assert_eq!(Rgb::parse_hex("e63946").unwrap().to_hex(), "#E63946");
    }

    #[test]
    fn palette_alternates_from_both_ends() {
        let colors: Vec<String> = Palette::new(bw(), 0.5).take(6).collect();
        // ronda 0: 0, 1, 0.5, 0.5, 1, 0 ; luego la ronda 1 empieza en 0.25
        assert_eq!(colors[0], "#000000");
        assert_eq!(colors[1], "#FFFFFF");
        assert_eq!(colors[2], "#7F7F7F");
        assert_eq!(colors[3], "#7F7F7F");
        assert_eq!(colors[4], "#FFFFFF");
        assert_eq!(colors[5], "#000000");
        let mut p = Palette::new(bw(), 0.5);
        let seventh = p.nth(6).unwrap();
        assert_eq!(seventh, bw().hex(0.25));
    }
}
