//! The interactive query menu.

use std::io::{self, BufRead, Write};
use std::path::Path;

use tracing::debug;

use crate::database::TermDatabase;
use crate::query::read_terms;

const BANNER: &str = "AVL Term Index\n==============";

const OPTIONS: &str = "\nOptions:
1. Query terms from a file
2. Query a single term
3. Display comparison statistics
4. Exit";

/// Runs the menu loop until the user exits or `input` is exhausted.
///
/// Problems with user input (bad choices, unreadable query files) are reported
/// on `output` and the menu carries on.
///
/// # Errors
///
/// Only I/O errors on `input` or `output` themselves are returned.
pub fn run_menu<R: BufRead, W: Write>(db: &TermDatabase, mut input: R, mut output: W) -> io::Result<()> {
    writeln!(output, "{BANNER}")?;
    loop {
        writeln!(output, "{OPTIONS}")?;
        let Some(choice) = prompt(&mut input, &mut output, "Enter your choice (1-4): ")? else {
            break;
        };
        match choice.parse::<u8>() {
            Ok(1) => {
                let Some(path) = prompt(&mut input, &mut output, "Enter the name of the text file containing terms: ")?
                else {
                    break;
                };
                query_file(db, Path::new(&path), &mut output)?;
            }
            Ok(2) => {
                let Some(term) = prompt(&mut input, &mut output, "Enter a term to search for: ")? else {
                    break;
                };
                writeln!(output, "\n{}", db.find(&term))?;
            }
            Ok(3) => writeln!(output, "{}", db.comparisons())?,
            Ok(4) => break,
            Ok(_) => writeln!(output, "Invalid choice. Please enter a number between 1 and 4.")?,
            Err(_) => writeln!(output, "Invalid input. Please enter a valid number.")?,
        }
    }
    writeln!(output, "Exiting program. Goodbye!")?;
    output.flush()
}

/// Prints `message` and reads one trimmed line, or `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> io::Result<Option<String>> {
    write!(output, "{message}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn query_file<W: Write>(db: &TermDatabase, path: &Path, output: &mut W) -> io::Result<()> {
    let terms = match read_terms(path) {
        Ok(terms) => terms,
        Err(e) => {
            debug!("Query file rejected: {e}");
            writeln!(output, "{e}")?;
            return writeln!(output, "Make sure the file exists and is accessible.");
        }
    };
    let report = db.find_all(&terms);
    writeln!(output, "\nResults:\n========")?;
    for outcome in &report.outcomes {
        writeln!(output, "{outcome}\n")?;
    }
    writeln!(output, "Summary: {report}")
}
