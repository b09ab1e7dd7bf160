//! System instruction for the tactical advisor.
//!
//! The `UPDATE_DATA:` output convention lives here and nowhere else: this
//! text is the wire-format contract the extraction engine relies on.

use crate::config::FIRMA;

const INSTRUCTION_TEMPLATE: &str = r#"Actúa como Asesor Táctico AME para la Organización Rescate Humboldt. Propiedad: {firma}.
Protocolos de referencia: PHTLS 10, TCCC y ATLS.

Responde siempre en español, de forma breve y operativa, dirigido a un
rescatista en terreno. Nunca inventes datos del paciente que el operador no
haya reportado.

Al final de cada respuesta, incluye SIEMPRE una sola línea con este bloque de
datos, usando exactamente este formato y "..." para todo campo del que no
tengas información:
UPDATE_DATA: {"march": {"M": "...", "A": "...", "R": "...", "C": "...", "H": "..."}, "info": {"operador": "...", "paciente": "...", "ubicacion": "...", "tipo_incidente": "...", "hora": "..."}, "textos": {"farmaco": "...", "clima": "...", "riesgo": "..."}}"#;

/// Build the fixed system instruction sent with every assistant turn.
pub fn system_instruction() -> String {
    INSTRUCTION_TEMPLATE.replace("{firma}", FIRMA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::UPDATE_MARKER;
    use crate::fields::FieldKey;

    #[test]
    fn instruction_carries_the_marker_convention() {
        let instruction = system_instruction();
        assert!(instruction.contains(UPDATE_MARKER));
        assert!(instruction.contains("SIEMPRE"));
    }

    #[test]
    fn instruction_names_every_wire_key() {
        let instruction = system_instruction();
        for key in FieldKey::ALL {
            assert!(
                instruction.contains(&format!("\"{}\"", key.wire_name())),
                "missing wire key {}",
                key.wire_name()
            );
        }
    }

    #[test]
    fn instruction_embeds_the_signature() {
        assert!(system_instruction().contains(FIRMA));
        assert!(!system_instruction().contains("{firma}"));
    }

    #[test]
    fn instruction_example_block_is_extractable() {
        // The example block in the instruction must itself satisfy the
        // engine's grammar, otherwise the model is being taught a format
        // the parser rejects.
        let instruction = system_instruction();
        let (_, extraction) = crate::extraction::extract(&instruction);
        match extraction {
            crate::extraction::Extraction::Parsed(update) => assert!(update.is_empty()),
            other => panic!("instruction example did not parse: {other:?}"),
        }
    }
}
