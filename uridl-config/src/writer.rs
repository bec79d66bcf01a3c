use std::io::Write as _;

use anyhow::Context as _;

use crate::abs_path::AbsPathBuf;
use crate::console::Console;
use crate::model::{LangName, ProblemNumber};
use crate::Result;

/// Returns directory for a problem, nested by `category` when it names a directory.
///
/// Blank categories and `.` or `..` collapse to `output_dir` itself.
pub fn category_dir(output_dir: &AbsPathBuf, category: Option<&str>) -> AbsPathBuf {
    match category.map(str::trim) {
        Some("") | Some(".") | Some("..") | None => output_dir.clone(),
        Some(category) => {
            // keep the category a single path component
            output_dir.join(category.replace(|c| c == '/' || c == '\\', "-"))
        }
    }
}

/// Writes `code` verbatim to `{output_dir}[/{category}]/{problem_number}.{ext}`.
///
/// Missing directories are created and an existing file is overwritten.
pub fn write_submission(
    output_dir: &AbsPathBuf,
    problem_number: &ProblemNumber,
    language: &LangName,
    code: &str,
    category: Option<&str>,
    cnsl: &mut Console,
) -> Result<AbsPathBuf> {
    let file_name = format!("{}.{}", problem_number, language.file_extension());
    let path = category_dir(output_dir, category).join(file_name);
    path.save_pretty(
        |mut file| {
            file.write_all(code.as_bytes())
                .context("Could not write source code")
        },
        true,
        Some(output_dir),
        cnsl,
    )
    .with_context(|| format!("Could not save submission of problem {}", problem_number))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::console::ConsoleConfig;

    #[test]
    fn test_write_submission_overwrites() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let output_dir = AbsPathBuf::try_new(test_dir.path())?.join("URI-Submissions");
        let mut cnsl = Console::buf(ConsoleConfig::default());
        let number = ProblemNumber::from("1001");
        let lang = LangName::from("c++");

        let first = write_submission(&output_dir, &number, &lang, "int main() {}\n", None, &mut cnsl)?;
        let code = "#include <cstdio>\r\n\tint main() {  }\n\n";
        let second = write_submission(&output_dir, &number, &lang, code, None, &mut cnsl)?;

        assert_eq!(first, second);
        assert_eq!(second, output_dir.join("1001.cpp"));
        assert_eq!(fs::read(&second)?, code.as_bytes());
        let output = cnsl.take_output()?;
        assert_eq!(output, "Saving 1001.cpp ... saved\nSaving 1001.cpp ... overwritten\n");
        Ok(())
    }

    #[test]
    fn test_write_submission_category() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let output_dir = AbsPathBuf::try_new(test_dir.path())?;
        let mut cnsl = Console::sink(ConsoleConfig::default());
        let tests = &[
            (Some("Iniciante"), "Iniciante/1002.py"),
            (Some(""), "1003.py"),
            (Some("  "), "1004.py"),
            (None, "1005.py"),
            (Some("Grafos/Arvores"), "Grafos-Arvores/1006.py"),
            (Some(".."), "1007.py"),
            (Some(" . "), "1008.py"),
            (Some("../x"), "..-x/1009.py"),
        ];
        for (i, (category, expected)) in tests.iter().enumerate() {
            let number = ProblemNumber::from(format!("{}", 1002 + i));
            let path = write_submission(
                &output_dir,
                &number,
                &"python3".into(),
                "print(1)",
                *category,
                &mut cnsl,
            )?;
            assert_eq!(path, output_dir.join(expected));
            assert!(path.as_ref().starts_with(&output_dir));
            assert!(path.as_ref().is_file());
        }
        Ok(())
    }

    #[test]
    fn test_write_submission_unknown_language() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let output_dir = AbsPathBuf::try_new(test_dir.path())?;
        let mut cnsl = Console::sink(ConsoleConfig::default());
        let path = write_submission(
            &output_dir,
            &"2000".into(),
            &"brainfuck".into(),
            "+",
            None,
            &mut cnsl,
        )?;
        assert_eq!(path, output_dir.join("2000.txt"));
        Ok(())
    }
}
