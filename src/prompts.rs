/// Fixed instruction sent ahead of every image and question.
pub const ANALYSIS_INSTRUCTION: &str = include_str!("../data/prompts/analysis_instruction.txt");

/// Instruction text as sent on the wire, without surrounding whitespace.
pub fn instruction() -> &'static str {
    ANALYSIS_INSTRUCTION.trim()
}
