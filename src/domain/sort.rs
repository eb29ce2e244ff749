use clap::ValueEnum;
use serde::Deserialize;

use super::Parcel;

/// Attribute to order a parcel listing by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Id,
    Length,
    Area,
    Owner,
}

/// Stable ascending sort by the chosen attribute
pub fn sort_parcels(parcels: &mut [Parcel], key: SortKey) {
    match key {
        SortKey::Id => parcels.sort_by_key(Parcel::id),
        SortKey::Length => parcels.sort_by(|a, b| a.length().total_cmp(&b.length())),
        SortKey::Area => parcels.sort_by(|a, b| a.area().total_cmp(&b.area())),
        SortKey::Owner => parcels.sort_by_key(Parcel::owner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parcel(id: i64, length: f64, area: f64, owner: i64) -> Parcel {
        let fields = [
            id.to_string(),
            String::new(),
            String::new(),
            length.to_string(),
            area.to_string(),
            "MULTIPOLYGON(((0 0,0 1,1 1,1 0,0 0)))".to_string(),
            owner.to_string(),
        ];
        Parcel::from_fields(&fields).unwrap()
    }

    fn ids(parcels: &[Parcel]) -> Vec<i64> {
        parcels.iter().map(Parcel::id).collect()
    }

    #[test]
    fn test_sort_by_each_key() {
        let mut parcels = vec![
            parcel(3, 10.0, 2.0, 7),
            parcel(1, 30.0, 1.0, 9),
            parcel(2, 20.0, 3.0, 8),
        ];

        sort_parcels(&mut parcels, SortKey::Id);
        assert_eq!(ids(&parcels), [1, 2, 3]);
        sort_parcels(&mut parcels, SortKey::Length);
        assert_eq!(ids(&parcels), [3, 2, 1]);
        sort_parcels(&mut parcels, SortKey::Area);
        assert_eq!(ids(&parcels), [1, 3, 2]);
        sort_parcels(&mut parcels, SortKey::Owner);
        assert_eq!(ids(&parcels), [3, 2, 1]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut parcels = vec![parcel(5, 1.0, 1.0, 1), parcel(4, 1.0, 1.0, 1)];
        sort_parcels(&mut parcels, SortKey::Owner);
        assert_eq!(ids(&parcels), [5, 4]);
    }
}
