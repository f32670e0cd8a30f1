use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Volumetric heat capacity of water in W·h/(litre·K), keyed by water temperature in deg C.
///
/// Multiplying a flow rate in litres/hour by a temperature difference in K and by the factor
/// for the water's temperature gives the heat carried by the flow in W. Values are
/// density × specific heat capacity / 3600 for water at each reference temperature.
pub static CONVERSION_FACTORS: LazyLock<BTreeMap<OrderedFloat<f64>, f64>> =
    LazyLock::new(|| {
        BTreeMap::from(
            [
                (10., 1.1641),
                (15., 1.1617),
                (20., 1.1595),
                (25., 1.1575),
                (30., 1.1556),
                (35., 1.1536),
                (40., 1.1517),
                (45., 1.1496),
                (50., 1.1474),
                (55., 1.1453),
                (60., 1.1428),
                (65., 1.1404),
                (70., 1.1379),
                (75., 1.1354),
                (80., 1.1328),
            ]
            .map(|(temperature, factor)| (OrderedFloat(temperature), factor)),
        )
    });

/// Return the conversion factor for the reference temperature nearest to `temperature`.
///
/// Candidates are visited in ascending temperature order and the first one at the minimum
/// distance wins, so a temperature exactly halfway between two reference points takes the
/// lower one.
pub fn conversion_factor(temperature: f64) -> f64 {
    CONVERSION_FACTORS
        .iter()
        .min_by_key(|(reference, _)| OrderedFloat((reference.0 - temperature).abs()))
        .map(|(_, factor)| *factor)
        .expect("conversion factor table is not empty")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    #[case(35., 1.1536)]
    #[case(10., 1.1641)]
    #[case(80., 1.1328)]
    fn should_use_exact_reference_temperature(#[case] temperature: f64, #[case] expected: f64) {
        assert_relative_eq!(conversion_factor(temperature), expected);
    }

    #[rstest]
    #[case(36.4, 1.1536)]
    #[case(38.1, 1.1517)]
    #[case(21.9, 1.1595)]
    fn should_use_nearest_reference_temperature(#[case] temperature: f64, #[case] expected: f64) {
        assert_relative_eq!(conversion_factor(temperature), expected);
    }

    #[rstest]
    #[case(-20., 1.1641)]
    #[case(0., 1.1641)]
    #[case(95., 1.1328)]
    fn should_clamp_to_outermost_reference_temperatures(
        #[case] temperature: f64,
        #[case] expected: f64,
    ) {
        assert_relative_eq!(conversion_factor(temperature), expected);
    }

    #[rstest]
    fn should_take_lower_reference_temperature_when_equidistant() {
        assert_relative_eq!(conversion_factor(37.5), 1.1536);
        assert_relative_eq!(conversion_factor(42.5), 1.1517);
    }

    #[test]
    fn should_decrease_with_temperature() {
        let factors = CONVERSION_FACTORS.values().collect::<Vec<_>>();
        assert!(factors.windows(2).all(|pair| pair[0] > pair[1]));
    }
}
