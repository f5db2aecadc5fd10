use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Mono,
    Spectrum,
    Fire,
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mono" | "monochrome" => Ok(Self::Mono),
            "spectrum" => Ok(Self::Spectrum),
            "fire" => Ok(Self::Fire),
            _ => Err(format!("Unknown color scheme: {}", s)),
        }
    }
}

impl ColorScheme {
    /// Get color for a given position (0.0 to 1.0) and intensity (0.0 to 1.0)
    pub fn get_color(&self, position: f32, intensity: f32) -> (u8, u8, u8) {
        let (h, s, l) = match self {
            // Plain white bars
            ColorScheme::Mono => return (255, 255, 255),
            ColorScheme::Spectrum => {
                // Classic spectrum: purple -> blue -> cyan -> green -> yellow -> red
                let hue = 270.0 - (position * 270.0);
                (hue, 0.9, 0.4 + intensity * 0.3)
            }
            ColorScheme::Fire => {
                // Red -> orange -> yellow
                let hue = position * 60.0;
                (hue, 0.95, 0.3 + intensity * 0.4)
            }
        };

        let hsl = Hsl::new(h, s, l);
        let rgb: Srgb = hsl.into_color();

        (
            (rgb.red * 255.0) as u8,
            (rgb.green * 255.0) as u8,
            (rgb.blue * 255.0) as u8,
        )
    }
}
