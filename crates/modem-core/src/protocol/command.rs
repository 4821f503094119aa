//! AT command builders (Host -> Device).

use super::constants::*;
use crate::modes::{CapabilityError, ModeRequest, ModeSet, RadioCombination, code_for_mode};

/// `+UIPADDR=<cid>`
pub fn build_uipaddr_query(cid: u32) -> String {
    format!("{CMD_UIPADDR_PREFIX}{cid}")
}

fn append_rat_value(command: &mut String, mode: ModeSet) -> Result<(), CapabilityError> {
    let code = code_for_mode(mode).ok_or(CapabilityError::NoMatchingCode { mode })?;
    command.push_str(&code.to_string());
    Ok(())
}

/// `+URAT=<allowed>[,<preferred>]`
///
/// Both sets must match a table entry exactly, and `preferred` must be empty
/// or a single generation inside `allowed`.
pub fn build_urat_set_command(allowed: ModeSet, preferred: ModeSet) -> Result<String, CapabilityError> {
    if !preferred.is_empty() && RadioCombination::with_preferred(allowed, preferred).is_none() {
        return Err(CapabilityError::InvalidCombination { allowed, preferred });
    }

    let mut command = String::from(CMD_URAT_SET_PREFIX);
    append_rat_value(&mut command, allowed)?;

    if !preferred.is_empty() {
        command.push(',');
        append_rat_value(&mut command, preferred)?;
    }

    Ok(command)
}

/// Resolve a client request against the supported combinations and encode it.
pub fn build_set_current_modes_command(
    combinations: &[RadioCombination],
    request: ModeRequest,
) -> Result<String, CapabilityError> {
    let (allowed, preferred) = request.resolve(combinations)?;
    build_urat_set_command(allowed, preferred)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::{UBLOX_COMBINATIONS, build_combinations};
    use crate::protocol::parser::parse_urat_read_response;

    #[test]
    fn test_urat_set_command() {
        assert_eq!(
            build_urat_set_command(ModeSet::G2 | ModeSet::G3, ModeSet::G3).unwrap(),
            "+URAT=1,2"
        );
        assert_eq!(build_urat_set_command(ModeSet::ALL, ModeSet::NONE).unwrap(), "+URAT=4");
    }

    #[test]
    fn test_urat_set_command_reproduces_table_codes() {
        for (code, mode) in UBLOX_COMBINATIONS.iter().enumerate() {
            assert_eq!(
                build_urat_set_command(*mode, ModeSet::NONE).unwrap(),
                format!("+URAT={code}")
            );
        }
    }

    #[test]
    fn test_urat_set_command_no_match() {
        assert_eq!(
            build_urat_set_command(ModeSet::NONE, ModeSet::NONE),
            Err(CapabilityError::NoMatchingCode {
                mode: ModeSet::NONE
            })
        );
        assert_eq!(
            build_urat_set_command(ModeSet::G2 | ModeSet::G4, ModeSet::NONE),
            Err(CapabilityError::NoMatchingCode {
                mode: ModeSet::G2 | ModeSet::G4
            })
        );
    }

    #[test]
    fn test_urat_set_command_invalid_preferred() {
        // Two generations preferred
        assert_eq!(
            build_urat_set_command(ModeSet::ALL, ModeSet::G2 | ModeSet::G4),
            Err(CapabilityError::InvalidCombination {
                allowed: ModeSet::ALL,
                preferred: ModeSet::G2 | ModeSet::G4,
            })
        );
        // Preferred outside allowed
        assert_eq!(
            build_urat_set_command(ModeSet::G2, ModeSet::G4),
            Err(CapabilityError::InvalidCombination {
                allowed: ModeSet::G2,
                preferred: ModeSet::G4,
            })
        );
    }

    #[test]
    fn test_set_then_read_back() {
        let command = build_urat_set_command(ModeSet::G3 | ModeSet::G4, ModeSet::G4).unwrap();
        let reply = command.replace("+URAT=", "+URAT: ");
        let current = parse_urat_read_response(&reply).unwrap();
        assert_eq!(current.allowed(), ModeSet::G3 | ModeSet::G4);
        assert_eq!(current.preferred(), ModeSet::G4);
    }

    #[test]
    fn test_set_current_modes_any() {
        let combinations = build_combinations(&[0, 1, 2, 3, 4, 5, 6], &[0, 2, 3]).unwrap();
        assert_eq!(
            build_set_current_modes_command(&combinations, ModeRequest::Any).unwrap(),
            "+URAT=4"
        );
    }

    #[test]
    fn test_set_current_modes_rejects_filtered_request() {
        let combinations = build_combinations(&[0, 1, 2, 3, 4, 5, 6], &[0, 2, 3]).unwrap();
        let lisa = crate::modes::filter_supported_modes(Some("LISA-U200"), combinations).unwrap();
        let request = ModeRequest::Explicit {
            allowed: ModeSet::G3 | ModeSet::G4,
            preferred: ModeSet::G4,
        };
        assert_eq!(
            build_set_current_modes_command(&lisa, request),
            Err(CapabilityError::UnsupportedCombination {
                allowed: ModeSet::G3 | ModeSet::G4,
                preferred: ModeSet::G4,
            })
        );
        assert!(matches!(
            build_set_current_modes_command(
                &[],
                ModeRequest::Explicit {
                    allowed: ModeSet::G3,
                    preferred: ModeSet::G2 | ModeSet::G3,
                }
            ),
            Err(CapabilityError::UnsupportedCombination { .. })
        ));
    }

    #[test]
    fn test_uipaddr_query() {
        assert_eq!(build_uipaddr_query(3), "+UIPADDR=3");
    }
}
