//! Combination building, per-model filtering and "any" selection.

use tracing::{debug, warn};

use super::table::mode_for_code;
use super::{CapabilityError, ModeSet, RadioCombination};
use crate::protocol::constants::{
    MODEL_PREFIXES_WITHOUT_4G, MODELS_WITHOUT_2G, SARA_U_MODELS_WITHOUT_2G,
};
use crate::protocol::parser::parse_urat_test_response;

/// Build the combinations advertised by a `+URAT=?` reply.
///
/// Every selected code yields a combination without preference. Multi-generation
/// entries additionally get one combination per usable preferred code.
pub fn build_combinations(
    selected: &[u32],
    preferred: &[u32],
) -> Result<Vec<RadioCombination>, CapabilityError> {
    let mut combinations = Vec::new();

    for &selected_code in selected {
        let Some(allowed) = mode_for_code(selected_code) else {
            warn!(code = selected_code, "Unexpected AcT value");
            continue;
        };
        let Some(base) = RadioCombination::new(allowed) else {
            continue;
        };
        combinations.push(base);

        if allowed.is_single() {
            continue;
        }

        for &preferred_code in preferred {
            let Some(preferred) = mode_for_code(preferred_code) else {
                warn!(code = preferred_code, "Unexpected AcT preferred value");
                continue;
            };
            if !preferred.is_single() {
                warn!(
                    code = preferred_code,
                    "AcT preferred value should be a single AcT"
                );
                continue;
            }
            match RadioCombination::with_preferred(allowed, preferred) {
                Some(combination) => combinations.push(combination),
                None => debug!(
                    allowed = %allowed,
                    preferred = %preferred,
                    "Preferred AcT not in allowed set, skipping"
                ),
            }
        }
    }

    if combinations.is_empty() {
        return Err(CapabilityError::NoUsableCombination);
    }

    Ok(combinations)
}

/// Technologies a model supports, as far as we know.
///
/// `+URAT=?` over-reports on several modules, so this is keyed on the model
/// string. Unknown or absent models get [`ModeSet::ALL`].
pub fn supported_modes_per_model(model: Option<&str>) -> ModeSet {
    let mut all = ModeSet::ALL;

    let Some(model) = model else {
        return all;
    };

    if MODELS_WITHOUT_2G.contains(&model) {
        all = all & !ModeSet::G2;
    } else if MODEL_PREFIXES_WITHOUT_4G
        .iter()
        .any(|prefix| model.starts_with(prefix))
    {
        all = all & !ModeSet::G4;
        if SARA_U_MODELS_WITHOUT_2G.contains(&model) {
            all = all & !ModeSet::G2;
        }
    }

    all
}

/// Drop combinations the model cannot actually do.
///
/// When the model is unrestricted the input vector is handed back untouched.
pub fn filter_supported_modes(
    model: Option<&str>,
    combinations: Vec<RadioCombination>,
) -> Result<Vec<RadioCombination>, CapabilityError> {
    let mask = supported_modes_per_model(model);
    if mask == ModeSet::ALL {
        return Ok(combinations);
    }

    let before = combinations.len();
    let filtered: Vec<RadioCombination> = combinations
        .into_iter()
        .filter(|c| mask.contains(c.allowed()))
        .collect();

    debug!(
        model = model.unwrap_or_default(),
        mask = %mask,
        before,
        after = filtered.len(),
        "Filtered mode combinations by model"
    );

    if filtered.is_empty() {
        return Err(CapabilityError::ModelFilterExhausted {
            model: model.unwrap_or_default().to_string(),
        });
    }

    Ok(filtered)
}

/// Allowed set to apply when the user asks for "any".
///
/// Picks the broadest allowed set among combinations that carry a preferred
/// generation; the first one wins on ties.
pub fn modem_mode_any(combinations: &[RadioCombination]) -> Result<ModeSet, CapabilityError> {
    let mut any = ModeSet::NONE;

    for combination in combinations.iter().filter(|c| c.has_preferred()) {
        if combination.allowed().count() > any.count() {
            any = combination.allowed();
        }
    }

    if any.is_empty() {
        return Err(CapabilityError::NoPreferredCombination);
    }
    Ok(any)
}

/// Parse a `+URAT=?` reply and restrict it to what `model` supports.
pub fn load_supported_modes(
    model: Option<&str>,
    reply: &str,
) -> Result<Vec<RadioCombination>, CapabilityError> {
    let combinations = parse_urat_test_response(reply)?;
    filter_supported_modes(model, combinations)
}

/// Mode change requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeRequest {
    /// Let the modem use everything it can.
    Any,
    /// Specific allowed set with an optional preferred generation.
    Explicit { allowed: ModeSet, preferred: ModeSet },
}

impl ModeRequest {
    /// Resolve to the concrete `(allowed, preferred)` pair to send.
    ///
    /// An explicit request must name one of `combinations` exactly.
    pub fn resolve(
        &self,
        combinations: &[RadioCombination],
    ) -> Result<(ModeSet, ModeSet), CapabilityError> {
        match *self {
            ModeRequest::Any => Ok((modem_mode_any(combinations)?, ModeSet::NONE)),
            ModeRequest::Explicit { allowed, preferred } => {
                let supported = combinations
                    .iter()
                    .any(|c| c.allowed() == allowed && c.preferred() == preferred);
                if !supported {
                    return Err(CapabilityError::UnsupportedCombination { allowed, preferred });
                }
                Ok((allowed, preferred))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::Generation;

    fn all_codes() -> Vec<RadioCombination> {
        build_combinations(&[0, 1, 2, 3, 4, 5, 6], &[0, 2, 3]).unwrap()
    }

    #[test]
    fn test_build_combinations_full_table() {
        let combinations = all_codes();
        // 1 + 3 + 1 + 1 + 4 + 3 + 3
        assert_eq!(combinations.len(), 16);

        for single in [ModeSet::G2, ModeSet::G3, ModeSet::G4] {
            let count = combinations.iter().filter(|c| c.allowed() == single).count();
            assert_eq!(count, 1, "single generation {single} must not get variants");
        }

        let all_variants: Vec<_> = combinations
            .iter()
            .filter(|c| c.allowed() == ModeSet::ALL)
            .map(|c| c.preferred())
            .collect();
        assert_eq!(
            all_variants,
            vec![ModeSet::NONE, ModeSet::G2, ModeSet::G3, ModeSet::G4]
        );

        for c in &combinations {
            assert!(c.allowed().contains(c.preferred()));
        }
    }

    #[test]
    fn test_build_combinations_skips_bad_preferred() {
        // 1 is a two-generation preferred value, 9 is out of the table
        let combinations = build_combinations(&[4], &[1, 9, 3]).unwrap();
        assert_eq!(combinations.len(), 2);
        assert_eq!(combinations[1].preferred(), ModeSet::G4);
    }

    #[test]
    fn test_build_combinations_skips_out_of_range_selected() {
        let combinations = build_combinations(&[2, 12], &[]).unwrap();
        assert_eq!(combinations.len(), 1);
        assert_eq!(
            build_combinations(&[12], &[0]),
            Err(CapabilityError::NoUsableCombination)
        );
    }

    #[test]
    fn test_supported_modes_per_model() {
        assert_eq!(supported_modes_per_model(None), ModeSet::ALL);
        assert_eq!(supported_modes_per_model(Some("TOBY-L210")), ModeSet::ALL);
        assert_eq!(
            supported_modes_per_model(Some("TOBY-L201")),
            ModeSet::G3 | ModeSet::G4
        );
        assert_eq!(
            supported_modes_per_model(Some("LISA-U200")),
            ModeSet::G2 | ModeSet::G3
        );
        assert_eq!(supported_modes_per_model(Some("SARA-U280")), ModeSet::G3);
    }

    #[test]
    fn test_filter_noop_keeps_identity() {
        let combinations = all_codes();
        let ptr = combinations.as_ptr();
        let filtered = filter_supported_modes(Some("TOBY-L210"), combinations).unwrap();
        assert_eq!(filtered.as_ptr(), ptr);
        assert_eq!(filtered.len(), 16);

        let filtered = filter_supported_modes(None, all_codes()).unwrap();
        assert_eq!(filtered.len(), 16);
    }

    #[test]
    fn test_filter_model_without_4g() {
        let filtered = filter_supported_modes(Some("LISA-U200"), all_codes()).unwrap();
        assert_eq!(filtered.len(), 5);
        assert!(filtered.iter().all(|c| !c.allowed().has(Generation::G4)));
    }

    #[test]
    fn test_filter_model_without_2g() {
        let filtered = filter_supported_modes(Some("TOBY-L201"), all_codes()).unwrap();
        assert_eq!(filtered.len(), 5);
        assert!(filtered.iter().all(|c| !c.allowed().contains(ModeSet::G2)));
    }

    #[test]
    fn test_filter_exhausted() {
        let only_4g = build_combinations(&[3], &[]).unwrap();
        assert_eq!(
            filter_supported_modes(Some("SARA-U201"), only_4g),
            Err(CapabilityError::ModelFilterExhausted {
                model: "SARA-U201".into()
            })
        );
    }

    #[test]
    fn test_modem_mode_any() {
        assert_eq!(modem_mode_any(&all_codes()).unwrap(), ModeSet::ALL);

        let filtered = filter_supported_modes(Some("TOBY-L201"), all_codes()).unwrap();
        assert_eq!(modem_mode_any(&filtered).unwrap(), ModeSet::G3 | ModeSet::G4);

        // First encountered wins on ties
        let combinations = build_combinations(&[5, 1], &[0]).unwrap();
        assert_eq!(modem_mode_any(&combinations).unwrap(), ModeSet::G2 | ModeSet::G4);
    }

    #[test]
    fn test_modem_mode_any_without_preferred() {
        let filtered = filter_supported_modes(Some("SARA-U280"), all_codes()).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(
            modem_mode_any(&filtered),
            Err(CapabilityError::NoPreferredCombination)
        );
    }

    #[test]
    fn test_mode_request_resolve() {
        let combinations = all_codes();
        assert_eq!(
            ModeRequest::Any.resolve(&combinations).unwrap(),
            (ModeSet::ALL, ModeSet::NONE)
        );
        let explicit = ModeRequest::Explicit {
            allowed: ModeSet::G3 | ModeSet::G4,
            preferred: ModeSet::G4,
        };
        assert_eq!(
            explicit.resolve(&combinations).unwrap(),
            (ModeSet::G3 | ModeSet::G4, ModeSet::G4)
        );
    }

    #[test]
    fn test_mode_request_resolve_filtered_out() {
        let filtered = filter_supported_modes(Some("LISA-U200"), all_codes()).unwrap();
        let request = ModeRequest::Explicit {
            allowed: ModeSet::G4,
            preferred: ModeSet::NONE,
        };
        assert!(request.resolve(&all_codes()).is_ok());
        assert_eq!(
            request.resolve(&filtered),
            Err(CapabilityError::UnsupportedCombination {
                allowed: ModeSet::G4,
                preferred: ModeSet::NONE,
            })
        );
    }

    #[test]
    fn test_load_supported_modes() {
        let combinations =
            load_supported_modes(Some("TOBY-L201"), "+URAT: (0-6),(0,2,3)\r\n").unwrap();
        assert_eq!(combinations.len(), 5);
    }
}
