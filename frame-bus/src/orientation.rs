use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Image orientation as reported by the capture device.
///
/// Raw values follow the platform enumeration order used by camera hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Up,
    Down,
    Left,
    Right,
    UpMirrored,
    DownMirrored,
    LeftMirrored,
    RightMirrored,
}

impl Orientation {
    /// Unknown raw values map to `Up`.
    pub fn from_raw(value: i64) -> Self {
        match value {
            0 => Orientation::Up,
            1 => Orientation::Down,
            2 => Orientation::Left,
            3 => Orientation::Right,
            4 => Orientation::UpMirrored,
            5 => Orientation::DownMirrored,
            6 => Orientation::LeftMirrored,
            7 => Orientation::RightMirrored,
            _ => Orientation::Up,
        }
    }

    pub fn raw(self) -> i64 {
        match self {
            Orientation::Up => 0,
            Orientation::Down => 1,
            Orientation::Left => 2,
            Orientation::Right => 3,
            Orientation::UpMirrored => 4,
            Orientation::DownMirrored => 5,
            Orientation::LeftMirrored => 6,
            Orientation::RightMirrored => 7,
        }
    }

    /// Orientation in the convention the detector expects.
    ///
    /// Sensor and detector disagree on the horizontal axis, so left and
    /// right swap. Mirrored variants are not understood by the detector and
    /// collapse to `Up`.
    pub fn for_detector(self) -> Self {
        match self {
            Orientation::Up => Orientation::Up,
            Orientation::Left => Orientation::Right,
            Orientation::Down => Orientation::Down,
            Orientation::Right => Orientation::Left,
            _ => Orientation::Up,
        }
    }
}

impl FromStr for Orientation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Orientation::Up),
            "down" => Ok(Orientation::Down),
            "left" => Ok(Orientation::Left),
            "right" => Ok(Orientation::Right),
            "up-mirrored" => Ok(Orientation::UpMirrored),
            "down-mirrored" => Ok(Orientation::DownMirrored),
            "left-mirrored" => Ok(Orientation::LeftMirrored),
            "right-mirrored" => Ok(Orientation::RightMirrored),
            other => Err(anyhow::anyhow!("unknown orientation: {}", other)),
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        let name = match self {
            Orientation::Up => "up",
            Orientation::Down => "down",
            Orientation::Left => "left",
            Orientation::Right => "right",
            Orientation::UpMirrored => "up-mirrored",
            Orientation::DownMirrored => "down-mirrored",
            Orientation::LeftMirrored => "left-mirrored",
            Orientation::RightMirrored => "right-mirrored",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_detector() {
        assert_eq!(Orientation::Left.for_detector(), Orientation::Right);
        assert_eq!(Orientation::Right.for_detector(), Orientation::Left);
        assert_eq!(Orientation::Up.for_detector(), Orientation::Up);
        assert_eq!(Orientation::Down.for_detector(), Orientation::Down);
        for mirrored in [
            Orientation::UpMirrored,
            Orientation::DownMirrored,
            Orientation::LeftMirrored,
            Orientation::RightMirrored,
        ] {
            assert_eq!(mirrored.for_detector(), Orientation::Up);
        }
    }

    #[test]
    fn test_unknown_raw_value_is_up() {
        assert_eq!(Orientation::from_raw(8), Orientation::Up);
        assert_eq!(Orientation::from_raw(-1), Orientation::Up);
        assert_eq!(Orientation::from_raw(8).for_detector(), Orientation::Up);
        for raw in 0..8 {
            assert_eq!(Orientation::from_raw(raw).raw(), raw);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("left".parse::<Orientation>().unwrap(), Orientation::Left);
        assert_eq!(
            "right-mirrored".parse::<Orientation>().unwrap(),
            Orientation::RightMirrored
        );
        assert!("sideways".parse::<Orientation>().is_err());
        assert_eq!(Orientation::DownMirrored.to_string(), "down-mirrored");
    }
}
