use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Raster with a zero width or height.
    EmptyRaster,
    /// Pixel buffer length does not match `width * height * 4`.
    RasterSize {
        expected: usize,
        actual: usize,
    },
    InvalidRotation(i32),
    UnknownAnchor(String),
    /// Fallback priority that is not a permutation of all nine anchors.
    InvalidFallbackPriority(String),
    ImageDecode(String),
    ImageEncode(String),
    FontParse(String),
    FontSubset(String),
    /// Text needs glyphs outside WinAnsi and no Unicode font is available.
    MissingGlyphs(String),
    /// Settings file that does not parse.
    Settings(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyRaster => write!(f, "page raster has zero width or height"),
            Error::RasterSize { expected, actual } => write!(
                f,
                "page raster buffer is {actual} bytes, expected {expected}"
            ),
            Error::InvalidRotation(deg) => {
                write!(f, "page rotation {deg} is not one of 0, 90, 180, 270")
            }
            Error::UnknownAnchor(name) => write!(f, "unknown anchor position: {name}"),
            Error::InvalidFallbackPriority(msg) => {
                write!(f, "invalid fallback priority: {msg}")
            }
            Error::ImageDecode(msg) => write!(f, "image decode error: {msg}"),
            Error::ImageEncode(msg) => write!(f, "image encode error: {msg}"),
            Error::FontParse(msg) => write!(f, "font parse error: {msg}"),
            Error::FontSubset(msg) => write!(f, "font subsetting failed: {msg}"),
            Error::MissingGlyphs(text) => {
                write!(f, "no font available for non-WinAnsi text: {text:?}")
            }
            Error::Settings(msg) => write!(f, "invalid settings: {msg}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
