/// Base register address of zone 0.
pub const FIRST_ZONE_BASE: u16 = 0x3164;
/// Address distance between consecutive zone bases.
pub const ZONE_STRIDE: u16 = 0x12;
/// Number of calibration zones in a GRAS block.
pub const ZONE_COUNT: usize = 7;
/// Register slots per zone: temperature, four alpha, four beta.
pub const SLOTS_PER_ZONE: usize = 9;
/// Every data line in this format carries a fixed width marker of 2 bytes.
pub const REGISTER_WIDTH: u16 = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ZoneIndex(u8);

impl ZoneIndex {
    pub fn new(index: u8) -> Option<ZoneIndex> {
        (usize::from(index) < ZONE_COUNT).then_some(Self(index))
    }

    pub fn all() -> impl Iterator<Item = ZoneIndex> {
        (0..ZONE_COUNT as u8).map(Self)
    }

    /// Locate the zone and slot owning `address`, if any.
    ///
    /// Zones are checked in increasing order; the first owning range wins.
    /// Addresses that match the line pattern but fall outside every zone
    /// range return `None`.
    pub fn from_address(address: u16) -> Option<(ZoneIndex, Slot)> {
        for zone in ZoneIndex::all() {
            let base = zone.base();
            if (base..base + ZONE_STRIDE).contains(&address) {
                let slot = Slot::from_repr(((address - base) / 2) as u8);
                return slot.map(|slot| (zone, slot));
            }
        }
        None
    }

    pub const fn base(self) -> u16 {
        FIRST_ZONE_BASE + self.0 as u16 * ZONE_STRIDE
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ZoneIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}", self.0))
    }
}

/// One of the nine per-zone parameter slots, in register address order.
///
/// The discriminant is the slot index within the zone, so the register
/// address is `base + 2 * repr` and `from_repr` is the address-to-field
/// mapping. The strum string forms are the names the CLI accepts in
/// `FIELD=VALUE` assignments.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    strum::FromRepr,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::VariantNames,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Slot {
    Temperature = 0,
    Alpha0,
    Alpha1,
    Alpha2,
    Alpha3,
    Beta0,
    Beta1,
    Beta2,
    Beta3,
}

impl Slot {
    pub const ALL: [Slot; SLOTS_PER_ZONE] = [
        Slot::Temperature,
        Slot::Alpha0,
        Slot::Alpha1,
        Slot::Alpha2,
        Slot::Alpha3,
        Slot::Beta0,
        Slot::Beta1,
        Slot::Beta2,
        Slot::Beta3,
    ];

    pub const fn address(self, zone: ZoneIndex) -> u16 {
        zone.base() + 2 * self as u16
    }
}

/// Calibration parameters of a single zone.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Zone {
    pub temperature: u16,
    pub alpha: [u16; 4],
    pub beta: [u16; 4],
}

impl Zone {
    pub fn get(&self, slot: Slot) -> u16 {
        let index = slot as usize;
        match index {
            0 => self.temperature,
            1..=4 => self.alpha[index - 1],
            _ => self.beta[index - 5],
        }
    }

    pub fn set(&mut self, slot: Slot, value: u16) {
        let index = slot as usize;
        match index {
            0 => self.temperature = value,
            1..=4 => self.alpha[index - 1] = value,
            _ => self.beta[index - 5] = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Slot, Zone, ZoneIndex, ZONE_COUNT};

    #[test]
    fn zone_bases_match_the_register_map() {
        let bases: Vec<u16> = ZoneIndex::all().map(|z| z.base()).collect();
        assert_eq!(bases, [0x3164, 0x3176, 0x3188, 0x319A, 0x31AC, 0x31BE, 0x31D0]);
    }

    #[test]
    fn slot_addresses_follow_the_stride() {
        let zone = ZoneIndex::new(3).expect("zone 3 exists");
        assert_eq!(zone.base(), 0x319A);
        assert_eq!(Slot::Temperature.address(zone), 0x319A);
        assert_eq!(Slot::Alpha2.address(zone), 0x31A2);
        assert_eq!(Slot::Beta3.address(zone), 0x31AA);
    }

    #[test]
    fn addresses_resolve_to_owning_zone_and_slot() {
        assert_eq!(ZoneIndex::from_address(0x319A), ZoneIndex::new(3).map(|z| (z, Slot::Temperature)));
        assert_eq!(ZoneIndex::from_address(0x31A2), ZoneIndex::new(3).map(|z| (z, Slot::Alpha2)));
        assert_eq!(ZoneIndex::from_address(0x316E), ZoneIndex::new(0).map(|z| (z, Slot::Beta0)));
    }

    #[test]
    fn addresses_outside_every_zone_resolve_to_none() {
        assert_eq!(ZoneIndex::from_address(0x3163), None);
        assert_eq!(ZoneIndex::from_address(0x31E2), None);
        assert_eq!(ZoneIndex::from_address(0x3160), None);
    }

    #[test]
    fn zone_index_rejects_out_of_range() {
        assert!(ZoneIndex::new(ZONE_COUNT as u8).is_none());
        assert!(ZoneIndex::new(6).is_some());
    }

    #[test]
    fn slot_names_round_trip() {
        assert_eq!("temperature".parse::<Slot>().ok(), Some(Slot::Temperature));
        assert_eq!("alpha2".parse::<Slot>().ok(), Some(Slot::Alpha2));
        assert_eq!("beta3".parse::<Slot>().ok(), Some(Slot::Beta3));
        assert!("gamma0".parse::<Slot>().is_err());
        assert_eq!(<&'static str>::from(Slot::Alpha0), "alpha0");
    }

    #[test]
    fn slot_repr_matches_the_field_table() {
        assert_eq!(Slot::from_repr(0), Some(Slot::Temperature));
        assert_eq!(Slot::from_repr(4), Some(Slot::Alpha3));
        assert_eq!(Slot::from_repr(5), Some(Slot::Beta0));
        assert_eq!(Slot::from_repr(8), Some(Slot::Beta3));
        assert_eq!(Slot::from_repr(9), None);
    }

    #[test]
    fn zone_get_set_cover_all_slots() {
        let mut zone = Zone::default();
        for (offset, slot) in Slot::ALL.into_iter().enumerate() {
            zone.set(slot, 100 + offset as u16);
        }
        assert_eq!(zone.temperature, 100);
        assert_eq!(zone.alpha, [101, 102, 103, 104]);
        assert_eq!(zone.beta, [105, 106, 107, 108]);
        assert_eq!(zone.get(Slot::Beta2), 107);
    }
}
