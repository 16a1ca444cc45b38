//! Enumerated orientation codes accepted per kind.

use std::fmt;
use std::str::FromStr;

macro_rules! define_orientation {
    ($(#[doc = $doc:expr])* $name:ident { $($variant:ident => $code:literal),+ $(,)? }) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every accepted code, in declaration order.
            pub const CODES: &'static [&'static str] = &[$($code),+];

            /// Wire spelling of the orientation.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(()),
                }
            }
        }
    };
}

define_orientation!(
    /// Compass orientation of a site.
    SiteOrientation {
        EastNorth => "EN",
        NorthWest => "NW",
        WestSouth => "WS",
        SouthEast => "SE",
    }
);

define_orientation!(
    /// Axis orientation of a room: the sign and direction of its first and
    /// second axis.
    RoomOrientation {
        NegENegN => "-E-N",
        NegEPosN => "-E+N",
        PosENegN => "+E-N",
        PosEPosN => "+E+N",
        NegNNegW => "-N-W",
        NegNPosW => "-N+W",
        PosNNegW => "+N-W",
        PosNPosW => "+N+W",
        NegWNegS => "-W-S",
        NegWPosS => "-W+S",
        PosWNegS => "+W-S",
        PosWPosS => "+W+S",
        NegSNegE => "-S-E",
        NegSPosE => "-S+E",
        PosSNegE => "+S-E",
        PosSPosE => "+S+E",
    }
);

define_orientation!(
    /// Which side of the room a rack faces.
    RackOrientation {
        Front => "front",
        Rear => "rear",
        Left => "left",
        Right => "right",
    }
);

define_orientation!(
    /// Mounting orientation of a device inside its rack.
    DeviceOrientation {
        Front => "front",
        Rear => "rear",
        FrontFlipped => "frontflipped",
        RearFlipped => "rearflipped",
    }
);
