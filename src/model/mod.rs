//! Typed representations of the IPP job-template and printer-description
//! values the core reasons about. The wire-level attribute tree itself
//! (value tags, groups, encoding) is owned by the `ipp` crate; these types
//! are the domain vocabulary layered on top of it.
mod bitset;
mod operation;
mod state;
mod which_job;

pub use bitset::{ColorModeSupported, IdentifyActions, SidesSupported, StateReasons};
pub use operation::PrinterOperation;
pub use state::{JobState, PrintQuality, PrinterState};
pub use which_job::WhichJob;

use ipp::value::IppValue;

/// `orientation-requested` values, per PWG 5100.3. `None` (7) is the
/// "do not rotate" sentinel; see the job-template validator for how its
/// acceptability as a *requested* value is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOrientation {
    Portrait = 3,
    Landscape = 4,
    ReverseLandscape = 5,
    ReversePortrait = 6,
    None = 7,
}

impl PageOrientation {
    pub const MIN: i32 = PageOrientation::Portrait as i32;
    pub const MAX: i32 = PageOrientation::None as i32;
}

impl TryFrom<i32> for PageOrientation {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        match value {
            3 => Ok(Self::Portrait),
            4 => Ok(Self::Landscape),
            5 => Ok(Self::ReverseLandscape),
            6 => Ok(Self::ReversePortrait),
            7 => Ok(Self::None),
            _ => Err(value),
        }
    }
}

impl From<PageOrientation> for i32 {
    fn from(value: PageOrientation) -> Self {
        value as i32
    }
}

impl TryFrom<IppValue> for PageOrientation {
    type Error = IppValue;

    fn try_from(value: IppValue) -> Result<Self, IppValue> {
        match value {
            IppValue::Enum(v) => Self::try_from(v).map_err(|_| IppValue::Enum(v)),
            _ => Err(value),
        }
    }
}

impl From<PageOrientation> for IppValue {
    fn from(value: PageOrientation) -> Self {
        IppValue::Enum(value as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub cross_feed: i32,
    pub feed: i32,
    pub units: i8,
}

impl Resolution {
    pub fn new_dpi(cross_feed: i32, feed: i32) -> Self {
        Self {
            cross_feed,
            feed,
            units: 3,
        }
    }
    pub fn new_dpcm(cross_feed: i32, feed: i32) -> Self {
        Self {
            cross_feed,
            feed,
            units: 4,
        }
    }
}

impl TryFrom<IppValue> for Resolution {
    type Error = IppValue;

    fn try_from(value: IppValue) -> Result<Self, IppValue> {
        if let IppValue::Resolution {
            cross_feed,
            feed,
            units,
        } = value
        {
            Ok(Self {
                cross_feed,
                feed,
                units,
            })
        } else {
            Err(value)
        }
    }
}

impl From<Resolution> for IppValue {
    fn from(value: Resolution) -> Self {
        IppValue::Resolution {
            cross_feed: value.cross_feed,
            feed: value.feed,
            units: value.units,
        }
    }
}
