//! Prompts for floorplan extraction.

/// Collection of prompts used for extraction.
pub struct Prompts;

impl Prompts {
    /// System prompt for the vision model.
    pub fn system_floorplan_analyst() -> &'static str {
        "You are an expert architectural analyst. You read floorplan drawings and report their room inventory as strict JSON."
    }

    /// Default task instruction, used when no optimized instruction is loaded.
    pub fn extract_instruction() -> &'static str {
        "Extract structured room data from the floorplan image. List every room shown in the layout and summarize the counts."
    }

    /// Output contract appended to every instruction.
    pub fn output_format() -> &'static str {
        r#"Room types must use these names where they apply: bedroom, bathroom, kitchen, living_room, dining_room, entry, lobby, corridor, outdoor, terrace, balcony, garage, storage, utility, laundry, closet, vestibule, other.

Return the following JSON format:
{
    "rooms": [
        {"type": "<room type>", "area_sqft": <number or null>}
    ],
    "total_rooms": <number of rooms in the list>,
    "has_garage": <true or false>,
    "num_bathrooms": <number of bathrooms>,
    "num_bedrooms": <number of bedrooms>
}

Directly return the final JSON structure. Do not output anything else."#
    }

    /// Full user prompt for an instruction.
    pub fn extraction_prompt(instruction: &str) -> String {
        format!("{}\n\n{}", instruction.trim(), Self::output_format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt_includes_contract() {
        let prompt = Prompts::extraction_prompt("  Count the rooms.  ");
        assert!(prompt.starts_with("Count the rooms.\n\n"));
        assert!(prompt.contains("\"num_bedrooms\""));
        assert!(prompt.contains("living_room"));
    }
}
