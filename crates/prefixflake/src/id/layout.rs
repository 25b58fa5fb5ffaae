use crate::PrefixflakeId;
use core::fmt;

/// A single named bit field of a packed ID, for display purposes.
pub struct FieldLayout {
    pub name: &'static str,
    pub bits: u8,
    pub value: u64,
}

impl PrefixflakeId {
    /// Returns the fields of this ID from most to least significant.
    #[must_use]
    pub fn fields(&self) -> [FieldLayout; 7] {
        [
            FieldLayout {
                name: "sign",
                bits: Self::SIGN_BITS as u8,
                value: u64::from(self.sign_bit()),
            },
            FieldLayout {
                name: "prefix",
                bits: Self::PREFIX_BITS as u8,
                value: u64::from(self.prefix_code()),
            },
            FieldLayout {
                name: "version",
                bits: Self::VERSION_BITS as u8,
                value: u64::from(self.version()),
            },
            FieldLayout {
                name: "business",
                bits: Self::BUSINESS_BITS as u8,
                value: u64::from(self.business()),
            },
            FieldLayout {
                name: "system",
                bits: Self::SYSTEM_BITS as u8,
                value: u64::from(self.system()),
            },
            FieldLayout {
                name: "timestamp",
                bits: Self::TIMESTAMP_BITS as u8,
                value: self.timestamp(),
            },
            FieldLayout {
                name: "sequence",
                bits: Self::SEQUENCE_BITS as u8,
                value: u64::from(self.sequence()),
            },
        ]
    }
}

fn center(s: impl ToString, width: usize) -> String {
    let s = s.to_string();
    let len = s.len();
    if len >= width {
        return s;
    }
    let pad = width - len;
    let left = pad / 2;
    let right = pad - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}

fn border(f: &mut fmt::Formatter<'_>, columns: &[usize]) -> fmt::Result {
    write!(f, "        +")?;
    for &w in columns {
        write!(f, "{}+", "-".repeat(w))?;
    }
    writeln!(f)
}

/// Writes a boxed table of the ID's bit fields, in decimal and hex.
pub(crate) fn write_bit_layout_debug(
    f: &mut fmt::Formatter<'_>,
    id: &PrefixflakeId,
    type_name: &str,
) -> fmt::Result {
    let fields = id.fields();

    // Column width is the widest of label, decimal and hex, plus padding
    let columns: Vec<usize> = fields
        .iter()
        .map(|field| {
            let label_len = format!("{} ({})", field.name, field.bits).len();
            let dec_len = field.value.to_string().len();
            let hex_len = format!("0x{:x}", field.value).len();
            label_len.max(dec_len).max(hex_len) + 2
        })
        .collect();

    writeln!(f, "{type_name} {{")?;
    writeln!(f, "    raw id     : 0x{:016x} ({})", id.to_raw(), id.to_raw())?;
    writeln!(f, "    padded     : {}", id.to_padded_string())?;
    writeln!(f, "    base32     : {}", id.encode())?;
    writeln!(f, "    category   : {}", id.category())?;
    writeln!(f, "    layout     :")?;

    border(f, &columns)?;
    write!(f, "        |")?;
    for (field, &w) in fields.iter().zip(&columns) {
        write!(f, "{}|", center(format!("{} ({})", field.name, field.bits), w))?;
    }
    writeln!(f)?;
    border(f, &columns)?;

    write!(f, "        |")?;
    for (field, &w) in fields.iter().zip(&columns) {
        write!(f, "{}|", center(field.value, w))?;
    }
    writeln!(f)?;

    write!(f, "        |")?;
    for (field, &w) in fields.iter().zip(&columns) {
        write!(f, "{}|", center(format!("0x{:x}", field.value), w))?;
    }
    writeln!(f)?;
    border(f, &columns)?;

    write!(f, "}}")
}
