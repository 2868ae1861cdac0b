//!
//! Resolution of the Markdown files a run operates on.

use crate::config::Config;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::Path;

/// Find the Markdown files to process.
///
/// Explicit `paths` win; with none given, the configured root directory is
/// walked. Directories are traversed with the `ignore` crate so gitignore
/// rules apply when configured; the result is sorted, deduplicated, and
/// restricted to `.md`/`.markdown` files.
pub fn find_markdown_files(paths: &[String], config: &Config) -> Result<Vec<String>> {
    let mut file_paths = Vec::new();
    let mut dirs = Vec::new();

    if paths.is_empty() {
        let root = &config.global.root;
        if !Path::new(root).exists() {
            // Nothing to glob; mirrors an empty glob result rather than
            // erroring on a repository without the conventional layout.
            log::debug!("root directory '{root}' does not exist, no files to process");
            return Ok(Vec::new());
        }
        dirs.push(root.clone());
    } else {
        // Explicit file arguments go straight to the processing list, so a
        // nonexistent path surfaces as a read error instead of silently
        // vanishing from the walk.
        for path in paths {
            if Path::new(path).is_dir() {
                dirs.push(path.clone());
            } else {
                file_paths.push(path.clone());
            }
        }
    }

    if !dirs.is_empty() {
        let mut walk_builder = WalkBuilder::new(&dirs[0]);
        for dir in dirs.iter().skip(1) {
            walk_builder.add(dir);
        }

        // Restrict traversal to Markdown files.
        let mut types_builder = ignore::types::TypesBuilder::new();
        types_builder.add("markdown", "*.md").context("invalid file type glob")?;
        types_builder
            .add("markdown", "*.markdown")
            .context("invalid file type glob")?;
        types_builder.select("markdown");
        let types = types_builder.build().context("failed to build file type matcher")?;
        walk_builder.types(types);

        let use_gitignore = config.global.respect_gitignore;
        walk_builder.ignore(use_gitignore);
        walk_builder.git_ignore(use_gitignore);
        walk_builder.git_global(use_gitignore);
        walk_builder.git_exclude(use_gitignore);
        walk_builder.parents(use_gitignore);
        walk_builder.hidden(true);
        walk_builder.require_git(false);

        for result in walk_builder.build() {
            match result {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() {
                        let file_path = path.to_string_lossy().to_string();
                        let cleaned_path = match file_path.strip_prefix("./") {
                            Some(stripped) => stripped.to_string(),
                            None => file_path,
                        };
                        file_paths.push(cleaned_path);
                    }
                }
                Err(err) => eprintln!("Error walking directory: {err}"),
            }
        }
    }

    // Multiple input paths can yield the same file twice.
    file_paths.sort();
    file_paths.dedup();

    // The type filter covers traversal; explicitly provided file paths still
    // need the extension check.
    file_paths.retain(|path_str| {
        let path = Path::new(path_str);
        path.extension().is_some_and(|ext| ext == "md" || ext == "markdown")
    });

    Ok(file_paths)
}
