use std;

/// Linear RGB color, uploaded to shaders as three floats
#[derive(Clone, Copy, PartialEq, Debug)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for Color {
    fn default() -> Color {
        Color::amber()
    }
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32) -> Color {
        Color {
            r,
            g,
            b,
        }
    }

    #[inline]
    pub fn red() -> Color {
        Color::new(1., 0., 0.)
    }

    #[inline]
    pub fn green() -> Color {
        Color::new(0., 1., 0.)
    }

    #[inline]
    pub fn blue() -> Color {
        Color::new(0., 0., 1.)
    }

    /// Default tint for scene nodes
    #[inline]
    pub fn amber() -> Color {
        Color::new(1., 0.8, 0.2)
    }

    /// Default viewport background
    #[inline]
    pub fn slate() -> Color {
        Color::new(0.1, 0.1, 0.15)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl std::str::FromStr for Color {
    type Err = String;

    /// Three whitespace-separated components, e.g. `1 0.8 0.2`
    fn from_str(text: &str) -> Result<Color, String> {
        let components = text.split_whitespace()
            .map(|part| part.parse::<f32>().map_err(|e| e.to_string()))
            .collect::<Result<Vec<f32>, String>>()?;

        if components.len() != 3 {
            return Err(format!(
                "expected 3 components, found {}",
                components.len(),
            ));
        }

        Ok(Color::new(components[0], components[1], components[2]))
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(out, "rgb( {}, {}, {} )", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use graphics::*;

    #[test]
    fn parse_color() {
        let color: Color = "1 0.8 0.2".parse().unwrap();
        assert!(color == Color::amber());

        let color: Color = "  0.1\t0.1   0.15 ".parse().unwrap();
        assert!(color == Color::slate());
    }

    #[test]
    fn parse_color_errors() {
        let error = "1 0.8".parse::<Color>().unwrap_err();
        eprintln!("Error: {}", error);
        assert!(error.contains("3 components"));

        assert!("1 green 0".parse::<Color>().is_err());
        assert!("".parse::<Color>().is_err());
    }

    #[test]
    fn upload_layout() {
        assert!(Color::blue().to_array() == [0., 0., 1.]);
    }
}
