//! Prompt construction for JML annotation generation.
//!
//! The prompt carries the annotation rules, one exemplar of well-annotated
//! code, the previous attempt's diagnostics when present, and finally the
//! code to annotate.

use crate::domain::SourceUnit;

/// Exemplar of correctly annotated code shown to the model.
const SAMPLE_ANNOTATED: &str = r#"// It establishes that the sum is always non-negative and within the range of Integer

public class Calculator {

    /*@
         requires a != null && b != null;
         ensures \result >= 0;
         ensures \result <= Integer.MAX_VALUE;
     @*/
    public int add(int a, int b) {
        return a + b;
    }
}
"#;

/// Build the generation prompt for a source unit.
///
/// When `feedback` is non-empty it is inserted as a "previous attempt had
/// these issues" block before the code, so the model is steered by the
/// verifier diagnostics instead of blindly repeating itself.
pub fn build_prompt(unit: &SourceUnit, feedback: &str) -> String {
    let mut prompt = format!(
        "You are a Java Modeling Language (JML) expert. Generate correct JML annotations \
for the following Java code following these rules:\n\
\n\
1. Use requires/ensures clauses for method contracts\n\
2. Define class invariants where needed\n\
3. Handle nullability and exceptions properly\n\
4. Use JML keywords correctly (e.g., signals, assignable)\n\
5. Validate data ranges with invariant clauses\n\
6. Do not use comments inside annotations\n\
\n\
Return ONLY the Java code with JML annotations in Java comment format without explanations.\n\
Return ONLY result code without any Markdown syntax.\n\
\n\
Example of code with JML annotations:\n{}\n",
        SAMPLE_ANNOTATED
    );

    if !feedback.is_empty() {
        prompt.push_str(&format!(
            "\nPrevious attempt had these issues:\n{}\n\nPlease address these issues in your new annotations.\n",
            feedback
        ));
    }

    prompt.push_str(&format!("\nJava Code to annotate:\n{}\n", unit.code));
    prompt
}
