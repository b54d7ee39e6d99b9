//! The `lcpp_test` built-in self-check: a smoke test run through `Config::run_self_test`,
//! kept separate from the crate's `#[cfg(test)]` unit and integration suites it shares no
//! code with.

use std::collections::HashMap;

use crate::config::Config;
use crate::driver::compile;
use crate::error::PreprocessError;

/// A canonical input/output pair.
struct Scenario {
    name: &'static str,
    input: &'static str,
    expected: &'static str,
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "object-like macro",
        input: "#define LEET 0x1337\nint x = LEET;",
        expected: "int x = 0x1337;",
    },
    Scenario {
        name: "function-like macro",
        input: "#define MAX(x,y) ((x)>(y)?(x):(y))\nint z = MAX(a, b);",
        expected: "int z = ((a)>(b)?(a):(b));",
    },
    Scenario {
        name: "nested conditional",
        input: "#define TRUE\n#ifdef TRUE\nA\n#else\nB\n#endif",
        expected: "A",
    },
    Scenario {
        name: "elif with defined and logical operators",
        input: "#define X\n#if defined(Y)\nno\n#elif defined(X) && !defined(Y)\nyes\n#else\nno\n#endif",
        expected: "yes",
    },
    Scenario {
        name: "continuation and multi-line function macro",
        input: "#define F(x) \\\n  (x+1)\nint v = F(7);",
        expected: "int v = (7+1);",
    },
    Scenario {
        name: "comments removed, directive still recognized",
        input: "/* prelude */\n#define K 5 // trailing\nK",
        expected: "5",
    },
];

/// Compile every scenario against a default [`Config`] and compare its output to the
/// documented expectation.
///
/// # Errors
/// The first scenario's `PreprocessError` if it fails to compile at all. Returns
/// `PreprocessError::UserError` (lineno 0) if a scenario compiles but its output
/// diverges from the documented expectation.
pub fn run_self_test() -> Result<(), PreprocessError> {
    let config = Config::new();
    for scenario in SCENARIOS {
        let (output, _) = compile(scenario.input, &config, &HashMap::new(), "self_test.c")?;
        if output != scenario.expected {
            return Err(PreprocessError::UserError {
                lineno: 0,
                message: format!(
                    "self-test scenario '{}' produced {:?}, expected {:?}",
                    scenario.name, output, scenario.expected
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_test_passes() {
        run_self_test().unwrap();
    }
}
