use crate::{Error, PrefixflakeId, Result};
use core::{fmt, str::FromStr};

macro_rules! categories {
    ($($variant:ident = $code:literal, $symbol:literal, $description:literal;)+) => {
        /// Semantic category encoded in the 5-bit prefix field.
        ///
        /// Each category owns one code in `0..=31` and one symbol of the text
        /// alphabet. Because the text form starts with the prefix bits, a
        /// text ID always begins with its category symbol, e.g. `H...` for
        /// [`Category::Host`].
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u8)]
        pub enum Category {
            $(
                #[doc = $description]
                $variant = $code,
            )+
        }

        impl Category {
            /// Every category, ordered by code.
            pub const ALL: [Self; 32] = [$(Self::$variant),+];

            /// Returns the category name, e.g. `"Host"`.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }

            /// Returns the text alphabet symbol for this category.
            #[must_use]
            pub const fn symbol(self) -> char {
                match self {
                    $(Self::$variant => $symbol,)+
                }
            }

            /// Returns a short description of what the category covers.
            #[must_use]
            pub const fn description(self) -> &'static str {
                match self {
                    $(Self::$variant => $description,)+
                }
            }
        }
    };
}

categories! {
    Default = 0, 'A', "Default prefix";
    Business = 1, 'B', "Business related";
    Customer = 2, 'C', "Customer related";
    Device = 3, 'D', "Device related";
    Event = 4, 'E', "Event related";
    File = 5, 'F', "File related";
    Gateway = 6, 'G', "Gateway related";
    Host = 7, 'H', "Host related";
    Instance = 8, 'I', "Instance related";
    Job = 9, 'J', "Job related";
    Kubernetes = 10, 'K', "Kubernetes related";
    Log = 11, 'L', "Log related";
    Module = 12, 'M', "Module related";
    Network = 13, 'N', "Network related";
    Organization = 14, 'O', "Organization related";
    Project = 15, 'P', "Project related";
    Queue = 16, 'Q', "Queue related";
    Resource = 17, 'R', "Resource related";
    Service = 18, 'S', "Service related";
    Task = 19, 'T', "Task related";
    User = 20, 'U', "User related";
    Version = 21, 'V', "Version related";
    Workflow = 22, 'W', "Workflow related";
    Experiment = 23, 'X', "Experiment related";
    Yield = 24, 'Y', "Data yield related";
    Zone = 25, 'Z', "Zone related";
    TwoFactor = 26, '2', "Two-factor authentication related";
    ThirdParty = 27, '3', "Third-party related";
    Backup = 28, '4', "Backup related";
    Test = 29, '5', "Test related";
    System = 30, '6', "System related";
    Reserved = 31, '7', "Reserved, unassigned";
}

impl Category {
    /// Returns the decimal code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Returns the 5-bit code. Same value as [`Self::code`], kept for callers
    /// that think of the prefix as a bit pattern.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8 & PrefixflakeId::PREFIX_MASK as u8
    }

    /// Maps the low 5 bits of `code` to a category. Total: every 5-bit value
    /// has a category.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        Self::ALL[(code & PrefixflakeId::PREFIX_MASK as u8) as usize]
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Default
    }
}

impl From<Category> for u8 {
    fn from(category: Category) -> Self {
        category.code()
    }
}

impl TryFrom<u8> for Category {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        if u64::from(code) > PrefixflakeId::PREFIX_MASK {
            return Err(Error::InvalidComponent {
                field: "prefix",
                value: u64::from(code),
                max: PrefixflakeId::PREFIX_MASK,
            });
        }
        Ok(Self::from_code(code))
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Parses a category name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownCategory { name: s.to_owned() })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
