//! `vd verify`: audit the state file without changing it.


use anyhow::Result;
use serde::Serialize;
use verdant_core::store::{StateFile, load_snapshot};
use verdant_core::timeline::audit_snapshot;

use crate::output::{InconsistencyReport, OutputMode, pretty_section, render_mode};

#[derive(Debug, Serialize)]
struct VerifyReport {
    ok: bool,
    path: String,
    problems: Vec<String>,
}

/// Exits non-zero (via [`InconsistencyReport`]) when any problem is found.
pub fn run_verify(state: &StateFile, output: OutputMode) -> Result<()> {
    let snapshot = load_snapshot(state.path())?;
    let problems: Vec<String> = audit_snapshot(*state.keyer(), &snapshot)
        .iter()
        .map(ToString::to_string)
        .collect();

    let report = VerifyReport {
        ok: problems.is_empty(),
        path: state.path().display().to_string(),
        problems,
    };
    render_mode(
        output,
        &report,
        |r, w| {
            for problem in &r.problems {
                writeln!(w, "{problem}")?;
            }
            if r.ok {
                writeln!(w, "ok")?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, &format!("Verify {}", r.path))?;
            if r.ok {
                return writeln!(w, "all timeline invariants hold");
            }
            for problem in &r.problems {
                writeln!(w, "  ✗ {problem}")?;
            }
            Ok(())
        },
    )?;

    if report.ok {
        Ok(())
    } else {
        Err(InconsistencyReport {
            count: report.problems.len(),
        }
        .into())
    }
}
