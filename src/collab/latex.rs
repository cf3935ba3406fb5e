//! Math compilation via pdflatex.
//!
//! Each fragment is wrapped in a minimal preview document and compiled to a
//! tightly-cropped PDF that the downstream layout tool places inline.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

use super::MathCompiler;

/// Invokes `pdflatex` for each math fragment.
pub struct PdfLatexCompiler;

impl PdfLatexCompiler {
    /// Preview document around a math fragment.
    ///
    /// Writers keep assuming `\Z`, `\R` and `\Q` exist; define them up
    /// front instead of bouncing articles back over it.
    fn wrap_document(source: &str, display: bool) -> String {
        let (open, close) = if display { (r"\[", r"\]") } else { (r"\(", r"\)") };
        format!(
            "\\documentclass{{article}}\n\
             \\usepackage[active,tightpage,pdftex]{{preview}}\n\
             \\usepackage{{amsmath}}\n\
             \\usepackage{{amssymb}}\n\
             \\usepackage{{amsfonts}}\n\
             \\newcommand{{\\Z}}{{\\mathbb{{Z}}}}\n\
             \\newcommand{{\\R}}{{\\mathbb{{R}}}}\n\
             \\newcommand{{\\Q}}{{\\mathbb{{Q}}}}\n\
             \\pagestyle{{empty}}\n\
             \\begin{{document}}\n\
             \\begin{{preview}}\n\
             {open}{source}{close}\n\
             \\end{{preview}}\n\
             \\end{{document}}\n"
        )
    }
}

impl MathCompiler for PdfLatexCompiler {
    fn compile(&self, source: &str, display: bool, output: &Path) -> Result<PathBuf> {
        let out_dir = output
            .parent()
            .ok_or_else(|| Error::MathCompile("output path has no parent".to_string()))?;
        let stem = output
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::MathCompile("output path has no file name".to_string()))?;

        let tex_path = out_dir.join(format!("{stem}.tex"));
        std::fs::write(&tex_path, Self::wrap_document(source, display))?;

        let status = Command::new("pdflatex")
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg("-output-directory")
            .arg(out_dir)
            .arg(&tex_path)
            .output()
            .map_err(|e| Error::MathCompile(format!("failed to run pdflatex: {e}")))?;

        // Clean up intermediates regardless of outcome.
        for ext in ["tex", "aux", "log"] {
            let _ = std::fs::remove_file(out_dir.join(format!("{stem}.{ext}")));
        }

        if !status.status.success() {
            return Err(Error::MathCompile(format!(
                "pdflatex exited with {}",
                status.status
            )));
        }

        let pdf_path = out_dir.join(format!("{stem}.pdf"));
        if !pdf_path.exists() {
            return Err(Error::MathCompile(
                "pdflatex reported success but produced no PDF".to_string(),
            ));
        }
        tracing::info!(artifact = %pdf_path.display(), source, "compiled math fragment");
        Ok(pdf_path)
    }
}
