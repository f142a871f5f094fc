use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{RagError, Result};

/// A file from the input folder, read once per index build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: String,
    pub text: String,
    pub order: usize,
}

/// Reads every supported document under `cfg.source_dir`, sorted by file name.
pub fn scan_files(cfg: &Config) -> Result<Vec<SourceDocument>> {
    let base = &cfg.source_dir;
    let base_display = base.display().to_string();
    let meta = fs::metadata(base).map_err(|e| RagError::io(base_display.clone(), e))?;
    if !meta.is_dir() {
        return Err(RagError::io(
            base_display,
            std::io::Error::other("not a directory"),
        ));
    }

    let max_depth = if cfg.recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(base)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_string_lossy().as_ref()));

    let mut results = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| base_display.clone());
            RagError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !has_included_ext(path, &cfg.include_exts) {
            debug!(path = %path.display(), "skipping unsupported file");
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        let len = entry
            .metadata()
            .map_err(|e| RagError::io(path_str.clone(), e.into()))?
            .len();
        if len > cfg.max_file_bytes {
            warn!(path = %path_str, bytes = len, "skipping file above size limit");
            continue;
        }
        let Some(text) = read_document(path)? else {
            continue;
        };
        if text.trim().is_empty() {
            continue;
        }
        let order = results.len();
        results.push(SourceDocument {
            path: path_str,
            text,
            order,
        });
    }

    if results.is_empty() {
        return Err(RagError::NoDocuments(base_display));
    }
    Ok(results)
}

fn read_document(path: &Path) -> Result<Option<String>> {
    if extension_of(path).as_deref() == Some("pdf") {
        return read_pdf(path);
    }
    let bytes = fs::read(path).map_err(|e| RagError::io(path.display().to_string(), e))?;
    Ok(Some(String::from_utf8_lossy(&bytes).replace('\r', "")))
}

#[cfg(feature = "pdf")]
fn read_pdf(path: &Path) -> Result<Option<String>> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| RagError::io(path.display().to_string(), std::io::Error::other(e.to_string())))?;
    let mut text = String::new();
    for page_num in doc.get_pages().keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page) => {
                text.push_str(&page);
                text.push('\n');
            }
            Err(err) => warn!(path = %path.display(), page = *page_num, "pdf page unreadable: {}", err),
        }
    }
    Ok(Some(text))
}

#[cfg(not(feature = "pdf"))]
fn read_pdf(path: &Path) -> Result<Option<String>> {
    warn!(path = %path.display(), "skipping pdf: built without the `pdf` feature");
    Ok(None)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

fn has_included_ext(path: &Path, exts: &[String]) -> bool {
    let lower = path.to_string_lossy().to_lowercase();
    exts.iter().any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg_for(dir: &Path) -> Config {
        let mut cfg = Config::from_lookup(|_| None);
        cfg.source_dir = dir.to_path_buf();
        cfg
    }

    #[test]
    fn reads_supported_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "segundo").unwrap();
        fs::write(dir.path().join("a.txt"), "primeiro\r\n").unwrap();
        fs::write(dir.path().join("c.bin"), "ignored").unwrap();
        fs::write(dir.path().join(".hidden.txt"), "ignored").unwrap();
        fs::write(dir.path().join("empty.txt"), "   \n").unwrap();

        let docs = scan_files(&cfg_for(dir.path())).unwrap();
        let names: Vec<_> = docs
            .iter()
            .map(|d| Path::new(&d.path).file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.md"]);
        assert_eq!(docs[0].text, "primeiro\n");
        assert_eq!(docs[1].order, 1);
    }

    #[test]
    fn nested_folders_only_when_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("cap1")).unwrap();
        fs::write(dir.path().join("cap1").join("secao.txt"), "texto").unwrap();
        fs::write(dir.path().join("intro.txt"), "intro").unwrap();

        let mut cfg = cfg_for(dir.path());
        assert_eq!(scan_files(&cfg).unwrap().len(), 1);
        cfg.recursive = true;
        assert_eq!(scan_files(&cfg).unwrap().len(), 2);
    }

    #[cfg(feature = "pdf")]
    fn write_pdf(path: &Path, line: &str) {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn extracts_text_from_a_pdf_textbook() {
        let dir = tempfile::tempdir().unwrap();
        write_pdf(&dir.path().join("livro.pdf"), "Selecao natural e mutacao");

        let docs = scan_files(&cfg_for(dir.path())).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].path.ends_with("livro.pdf"));
        assert!(docs[0].text.contains("Selecao natural e mutacao"));
    }

    #[test]
    fn missing_or_empty_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_files(&cfg_for(dir.path())).unwrap_err();
        assert!(matches!(err, RagError::NoDocuments(_)));

        let err = scan_files(&cfg_for(&dir.path().join("nope"))).unwrap_err();
        assert!(matches!(err, RagError::Io { .. }));
    }
}
