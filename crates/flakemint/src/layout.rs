use core::fmt;

use crate::{ConfigError, GeneratorConfig};

/// Total width of a packed identifier.
pub const ID_BITS: u32 = 64;

/// The bit layout of a packed identifier, derived from a validated
/// [`GeneratorConfig`].
///
/// From most to least significant bit an id holds:
///
/// ```text
/// [ sign | timestamp - epoch | instance id | sequence ]
/// ```
///
/// The generator never packs an offset wider than the timestamp field, so the
/// sign bits stay clear and ids remain positive in a signed 64-bit column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitLayout {
    sign_bits: u8,
    timestamp_bits: u8,
    instance_bits: u8,
    sequence_bits: u8,
    instance_shift: u32,
    timestamp_shift: u32,
    sequence_mask: u64,
    instance_mask: u64,
    timestamp_mask: u64,
    epoch: u64,
    instance_id: u64,
}

/// The fields recovered from a packed identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlakeParts {
    /// Milliseconds since the UNIX epoch (the layout epoch is added back).
    pub timestamp_ms: u64,
    pub instance_id: u64,
    pub sequence: u64,
}

impl BitLayout {
    /// Packs an absolute timestamp and a sequence value with this layout's
    /// instance id.
    ///
    /// The caller guarantees `epoch <= timestamp_ms <= epoch + max_timestamp()`
    /// and `sequence <= max_sequence()`; the generator only calls this with
    /// values it has already checked.
    #[inline]
    pub const fn pack(&self, timestamp_ms: u64, sequence: u64) -> u64 {
        ((timestamp_ms - self.epoch) << self.timestamp_shift)
            | (self.instance_id << self.instance_shift)
            | sequence
    }

    /// Splits a packed identifier back into its fields.
    pub const fn decompose(&self, id: u64) -> FlakeParts {
        FlakeParts {
            timestamp_ms: ((id >> self.timestamp_shift) & self.timestamp_mask) + self.epoch,
            instance_id: (id >> self.instance_shift) & self.instance_mask,
            sequence: id & self.sequence_mask,
        }
    }

    pub const fn sign_bits(&self) -> u8 {
        self.sign_bits
    }

    pub const fn timestamp_bits(&self) -> u8 {
        self.timestamp_bits
    }

    pub const fn instance_bits(&self) -> u8 {
        self.instance_bits
    }

    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    pub const fn instance_shift(&self) -> u32 {
        self.instance_shift
    }

    pub const fn timestamp_shift(&self) -> u32 {
        self.timestamp_shift
    }

    pub const fn sequence_mask(&self) -> u64 {
        self.sequence_mask
    }

    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    pub const fn instance_id(&self) -> u64 {
        self.instance_id
    }

    pub const fn max_sequence(&self) -> u64 {
        self.sequence_mask
    }

    pub const fn max_instance_id(&self) -> u64 {
        self.instance_mask
    }

    /// Largest timestamp offset (relative to the epoch) the layout can hold.
    pub const fn max_timestamp(&self) -> u64 {
        self.timestamp_mask
    }
}

impl TryFrom<&GeneratorConfig> for BitLayout {
    type Error = ConfigError;

    fn try_from(cfg: &GeneratorConfig) -> Result<Self, Self::Error> {
        let widths = [
            ("sequence_bits", cfg.sequence_bits),
            ("instance_bits", cfg.instance_bits),
            ("timestamp_bits", cfg.timestamp_bits),
            ("sign_bits", cfg.sign_bits),
        ];
        if let Some((field, _)) = widths.iter().find(|(_, bits)| *bits == 0) {
            return Err(ConfigError::ZeroWidth { field: *field });
        }

        let total: u32 = widths.iter().map(|(_, bits)| u32::from(*bits)).sum();
        if total != ID_BITS {
            return Err(ConfigError::BitSum { total });
        }

        // Every width is in 1..=61 from here on, so none of the shifts below
        // can overflow.
        let instance_mask = low_mask(cfg.instance_bits);
        if cfg.instance_id > instance_mask {
            return Err(ConfigError::InstanceOutOfRange {
                instance_id: cfg.instance_id,
                max: instance_mask,
            });
        }

        let instance_shift = u32::from(cfg.sequence_bits);
        Ok(Self {
            sign_bits: cfg.sign_bits,
            timestamp_bits: cfg.timestamp_bits,
            instance_bits: cfg.instance_bits,
            sequence_bits: cfg.sequence_bits,
            instance_shift,
            timestamp_shift: instance_shift + u32::from(cfg.instance_bits),
            sequence_mask: low_mask(cfg.sequence_bits),
            instance_mask,
            timestamp_mask: low_mask(cfg.timestamp_bits),
            epoch: cfg.timestamp_epoch,
            instance_id: cfg.instance_id,
        })
    }
}

impl TryFrom<GeneratorConfig> for BitLayout {
    type Error = ConfigError;

    fn try_from(cfg: GeneratorConfig) -> Result<Self, Self::Error> {
        Self::try_from(&cfg)
    }
}

impl fmt::Display for BitLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sign={} timestamp={} instance={} sequence={} epoch={} instance_id={}",
            self.sign_bits,
            self.timestamp_bits,
            self.instance_bits,
            self.sequence_bits,
            self.epoch,
            self.instance_id
        )
    }
}

const fn low_mask(bits: u8) -> u64 {
    (1_u64 << bits) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic(instance_id: u64) -> BitLayout {
        GeneratorConfig::new(instance_id).layout().unwrap()
    }

    #[test]
    fn shifts_and_masks() {
        let layout = classic(7);
        assert_eq!(layout.instance_shift(), 12);
        assert_eq!(layout.timestamp_shift(), 22);
        assert_eq!(layout.sequence_mask(), 0xFFF);
        assert_eq!(layout.max_instance_id(), 1023);
        assert_eq!(layout.max_timestamp(), (1 << 41) - 1);
    }

    #[test]
    fn pack_matches_reference_formula() {
        let layout = classic(7);
        let ts = 1_700_000_000_123_u64;
        for seq in [0, 1, 42, 4095] {
            assert_eq!(layout.pack(ts, seq), (ts << 22) | (7 << 12) | seq);
        }
    }

    #[test]
    fn pack_subtracts_epoch() {
        let epoch = 1_735_689_600_000;
        let layout = GeneratorConfig::new(1).with_epoch(epoch).layout().unwrap();
        let id = layout.pack(epoch + 5, 3);
        assert_eq!(id, (5 << 22) | (1 << 12) | 3);
    }

    #[test]
    fn decompose_recovers_fields() {
        let epoch = 1_288_834_974_657;
        let layout = GeneratorConfig::new(513)
            .with_epoch(epoch)
            .with_instance_bits(11)
            .with_sequence_bits(11)
            .layout()
            .unwrap();
        let ts = epoch + 123_456_789;
        let id = layout.pack(ts, 2047);
        assert_eq!(
            layout.decompose(id),
            FlakeParts {
                timestamp_ms: ts,
                instance_id: 513,
                sequence: 2047,
            }
        );
    }

    #[test]
    fn sign_bit_stays_clear() {
        let layout = classic(1023);
        let id = layout.pack(layout.max_timestamp(), layout.max_sequence());
        assert_eq!(id >> 63, 0);
        assert_eq!(id, i64::MAX as u64);
    }

    #[test]
    fn display_lists_widths() {
        assert_eq!(
            classic(4).to_string(),
            "sign=1 timestamp=41 instance=10 sequence=12 epoch=0 instance_id=4"
        );
    }
}
