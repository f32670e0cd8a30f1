use crate::core::metrics::{derivation_for_segment, Derivation};

/// One segment of a dot-separated path into a snapshot.
#[derive(Clone, Copy)]
pub(crate) enum Segment<'p> {
    /// An all-digit segment, addressing an item of a list. Indexes too large to represent are
    /// kept as `usize::MAX` so they are simply out of range.
    Index(&'p str, usize),
    /// A segment naming a derivation.
    Computed(&'p str, Derivation),
    Key(&'p str),
}

impl<'p> Segment<'p> {
    fn parse(raw: &'p str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|byte| byte.is_ascii_digit()) {
            return Segment::Index(raw, raw.parse().unwrap_or(usize::MAX));
        }
        match derivation_for_segment(raw) {
            Some(derivation) => Segment::Computed(raw, derivation),
            None => Segment::Key(raw),
        }
    }
}

/// Split `path` into its segments, each paired with the path consumed before it (`None` for
/// the first segment).
pub(crate) fn segments(path: &str) -> impl Iterator<Item = (Option<&str>, Segment<'_>)> {
    let mut offset: usize = 0;
    path.split('.').map(move |raw| {
        let parent = offset.checked_sub(1).map(|end| &path[..end]);
        offset += raw.len() + 1;
        (parent, Segment::parse(raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn describe(path: &str) -> Vec<(Option<&str>, String)> {
        segments(path)
            .map(|(parent, segment)| {
                let segment = match segment {
                    Segment::Index(_, index) => format!("index {index}"),
                    Segment::Computed(name, _) => format!("computed {name}"),
                    Segment::Key(key) => format!("key {key}"),
                };
                (parent, segment)
            })
            .collect()
    }

    #[rstest]
    fn should_split_plain_path() {
        assert_eq!(
            describe("hp1.temperatureWaterOut"),
            vec![
                (None, "key hp1".to_string()),
                (Some("hp1"), "key temperatureWaterOut".to_string()),
            ]
        );
    }

    #[rstest]
    fn should_recognise_list_indexes_and_computed_metrics() {
        assert_eq!(
            describe("hp1.readings.2.computedWaterDelta"),
            vec![
                (None, "key hp1".to_string()),
                (Some("hp1"), "key readings".to_string()),
                (Some("hp1.readings"), "index 2".to_string()),
                (Some("hp1.readings.2"), "computed computedWaterDelta".to_string()),
            ]
        );
    }

    #[rstest]
    fn should_keep_oversized_index_out_of_range() {
        assert_eq!(
            describe("list.99999999999999999999999"),
            vec![
                (None, "key list".to_string()),
                (Some("list"), format!("index {}", usize::MAX)),
            ]
        );
    }

    #[rstest]
    fn should_treat_unknown_computed_name_as_key() {
        assert_eq!(
            describe("computedNothing"),
            vec![(None, "key computedNothing".to_string())]
        );
    }

    #[rstest]
    fn should_keep_empty_segments_as_keys() {
        assert_eq!(
            describe("hp1..power"),
            vec![
                (None, "key hp1".to_string()),
                (Some("hp1"), "key ".to_string()),
                (Some("hp1."), "key power".to_string()),
            ]
        );
    }
}
