//! Keystroke alleles
//!
//! Two single-key alphabets: `Key` taps one control per gene, `KeyToggle`
//! presses or releases one control per gene and leaves the rest alone.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenomeError;
use crate::evaluation::program::{Action, ActuationProgram, Key, Step, DEFAULT_HOLD};
use crate::genome::traits::Allele;

impl Allele for Key {
    fn random<R: Rng>(rng: &mut R) -> Self {
        *Key::ALL.choose(rng).unwrap_or(&Key::Q)
    }

    fn append_steps(
        &self,
        _index: usize,
        program: &mut ActuationProgram,
    ) -> Result<(), GenomeError> {
        program.tap(*self, DEFAULT_HOLD);
        Ok(())
    }
}

/// Press, release, or keep the current control state
///
/// Serialized as a single character: an uppercase letter presses the control,
/// a lowercase letter releases it and `+` keeps everything as it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
pub enum KeyToggle {
    Press(Key),
    Release(Key),
    Keep,
}

impl KeyToggle {
    /// The full nine-symbol alphabet
    pub const ALL: [KeyToggle; 9] = [
        KeyToggle::Release(Key::Q),
        KeyToggle::Release(Key::W),
        KeyToggle::Release(Key::O),
        KeyToggle::Release(Key::P),
        KeyToggle::Press(Key::Q),
        KeyToggle::Press(Key::W),
        KeyToggle::Press(Key::O),
        KeyToggle::Press(Key::P),
        KeyToggle::Keep,
    ];
}

impl From<KeyToggle> for char {
    fn from(toggle: KeyToggle) -> Self {
        match toggle {
            KeyToggle::Press(key) => key.as_char().to_ascii_uppercase(),
            KeyToggle::Release(key) => key.as_char(),
            KeyToggle::Keep => '+',
        }
    }
}

impl TryFrom<char> for KeyToggle {
    type Error = GenomeError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        if c == '+' {
            return Ok(KeyToggle::Keep);
        }
        let key = Key::from_char(c).ok_or(GenomeError::UnknownCode(c))?;
        if c.is_ascii_uppercase() {
            Ok(KeyToggle::Press(key))
        } else {
            Ok(KeyToggle::Release(key))
        }
    }
}

impl fmt::Display for KeyToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

impl Allele for KeyToggle {
    fn random<R: Rng>(rng: &mut R) -> Self {
        *KeyToggle::ALL.choose(rng).unwrap_or(&KeyToggle::Keep)
    }

    fn append_steps(
        &self,
        _index: usize,
        program: &mut ActuationProgram,
    ) -> Result<(), GenomeError> {
        let actions = match *self {
            KeyToggle::Press(key) => vec![Action::Press(key)],
            KeyToggle::Release(key) => vec![Action::Release(key)],
            KeyToggle::Keep => Vec::new(),
        };
        program.push(Step::new(actions, DEFAULT_HOLD));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::sequence::Sequence;
    use crate::genome::traits::Genome;

    #[test]
    fn test_key_sequence_decodes_to_taps() {
        let genome = Sequence::new(vec![Key::Q, Key::O]);
        let program = genome.decode().unwrap();

        assert_eq!(program.len(), 4);
        assert_eq!(program.steps()[0].actions, vec![Action::Press(Key::Q)]);
        assert_eq!(program.steps()[3].actions, vec![Action::Release(Key::O)]);
        assert_eq!(program.duration(), DEFAULT_HOLD * 2);
    }

    #[test]
    fn test_toggle_char_codes() {
        assert_eq!(KeyToggle::try_from('W'), Ok(KeyToggle::Press(Key::W)));
        assert_eq!(KeyToggle::try_from('w'), Ok(KeyToggle::Release(Key::W)));
        assert_eq!(KeyToggle::try_from('+'), Ok(KeyToggle::Keep));
        assert_eq!(KeyToggle::try_from('x'), Err(GenomeError::UnknownCode('x')));

        for toggle in KeyToggle::ALL {
            assert_eq!(KeyToggle::try_from(char::from(toggle)), Ok(toggle));
        }
    }

    #[test]
    fn test_toggle_keep_only_waits() {
        let genome = Sequence::new(vec![KeyToggle::Keep]);
        let program = genome.decode().unwrap();

        assert!(program.steps()[0].actions.is_empty());
        assert_eq!(program.steps()[0].hold, DEFAULT_HOLD);
    }

    #[test]
    fn test_toggle_json_uses_characters() {
        let genome = Sequence::new(vec![KeyToggle::Press(Key::P), KeyToggle::Keep]);
        let json = serde_json::to_string(&genome).unwrap();
        assert_eq!(json, r#"["P","+"]"#);
    }
}
