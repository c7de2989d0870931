//! Grammar loading and verification.
//!
//! The Sea grammar is normally linked into this crate, but a grammar built
//! separately by the tree-sitter CLI can also be loaded from a shared
//! library. Both paths go through the same checks: the constructor must not
//! return null, the ABI version must be one the linked runtime understands,
//! and a [`Parser`] must accept the language.

use crate::{Error, LANGUAGE, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tree_sitter::{LANGUAGE_VERSION, Language, MIN_COMPATIBLE_LANGUAGE_VERSION, Parser};
use tree_sitter_language::LanguageFn;

/// Name of the constructor symbol exported by a compiled Sea grammar.
pub const LANGUAGE_SYMBOL: &str = "tree_sitter_sea";

/// Checks that an ABI version falls within what the linked runtime supports.
pub fn check_abi_version(version: usize) -> Result<()> {
    if (MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version) {
        Ok(())
    } else {
        Err(Error::AbiVersion {
            version,
            min: MIN_COMPATIBLE_LANGUAGE_VERSION,
            max: LANGUAGE_VERSION,
        })
    }
}

/// Verifies that a language handle is usable by the runtime.
pub fn verify_language(language: &Language) -> Result<()> {
    check_abi_version(language.version())?;

    if language.node_kind_count() == 0 {
        return Err(Error::GrammarLoad("grammar declares no node kinds".to_string()));
    }

    let mut parser = Parser::new();
    parser
        .set_language(language)
        .map_err(|e| Error::GrammarLoad(e.to_string()))?;

    Ok(())
}

/// Loads and verifies the built-in Sea grammar.
///
/// Safe to call any number of times; every call constructs a fresh handle to
/// the same static parse tables.
pub fn load_language() -> Result<Language> {
    let language = language_from_fn(LANGUAGE)?;
    verify_language(&language)?;
    debug!(
        abi = language.version(),
        node_kinds = language.node_kind_count(),
        "Loaded built-in Sea grammar"
    );
    Ok(language)
}

fn language_from_fn(builder: LanguageFn) -> Result<Language> {
    // SAFETY: `builder` is a generated tree-sitter constructor; it takes no
    // arguments and returns a pointer to static parse tables.
    let raw = unsafe { (builder.into_raw())() };
    // SAFETY: the tables of a linked grammar are static.
    unsafe { language_from_raw(raw, "built-in grammar") }
}

/// Wraps a constructor's result, rejecting a null handle.
///
/// # Safety
/// A non-null `raw` must point to tree-sitter parse tables that outlive the
/// returned handle.
unsafe fn language_from_raw(raw: *const (), origin: &str) -> Result<Language> {
    if raw.is_null() {
        return Err(Error::GrammarLoad(format!("{origin} returned a null language handle")));
    }
    Ok(unsafe { Language::from_raw(raw as _) })
}

/// A Sea grammar loaded from a shared library.
///
/// The library stays mapped for as long as this value lives.
pub struct LoadedGrammar {
    // Declared before `_library` so the handle is dropped first.
    language: Language,
    path: PathBuf,
    _library: libloading::Library,
}

impl LoadedGrammar {
    /// The verified language handle.
    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Path of the library the grammar was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for LoadedGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedGrammar")
            .field("path", &self.path)
            .field("abi", &self.language.version())
            .finish()
    }
}

/// Loads a Sea grammar from a compiled shared library.
///
/// Missing files, files that are not loadable libraries, libraries without
/// the `tree_sitter_sea` symbol and null or incompatible handles are all
/// reported as errors.
pub fn load_language_from_library(path: &Path) -> Result<LoadedGrammar> {
    if !path.is_file() {
        return Err(Error::Library(format!("{} does not exist", path.display())));
    }

    // SAFETY: loading a tree-sitter grammar library runs no initializers
    // beyond those of a plain C object.
    let library = unsafe { libloading::Library::new(path) }
        .map_err(|e| Error::Library(format!("{}: {}", path.display(), e)))?;

    // SAFETY: the symbol is a tree-sitter language constructor with the
    // declared signature.
    let raw = unsafe {
        let constructor: libloading::Symbol<unsafe extern "C" fn() -> *const ()> = library
            .get(LANGUAGE_SYMBOL.as_bytes())
            .map_err(|e| Error::Library(format!("{}: missing {}: {}", path.display(), LANGUAGE_SYMBOL, e)))?;
        constructor()
    };

    // SAFETY: the library outlives the handle inside `LoadedGrammar`.
    let language = unsafe { language_from_raw(raw, &path.display().to_string())? };
    verify_language(&language)?;

    info!(path = %path.display(), abi = language.version(), "Loaded Sea grammar library");

    Ok(LoadedGrammar {
        language,
        path: path.to_path_buf(),
        _library: library,
    })
}

/// Returns the platform-specific library filename for the Sea grammar.
pub fn default_library_name() -> String {
    let safe_name = LANGUAGE_SYMBOL.replace('_', "-");
    #[cfg(target_os = "macos")]
    {
        format!("lib{safe_name}.dylib")
    }
    #[cfg(target_os = "windows")]
    {
        format!("{safe_name}.dll")
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        format!("lib{safe_name}.so")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_abi_range() {
        assert!(check_abi_version(LANGUAGE_VERSION).is_ok());
        assert!(check_abi_version(MIN_COMPATIBLE_LANGUAGE_VERSION).is_ok());
        assert!(check_abi_version(0).is_err());

        match check_abi_version(LANGUAGE_VERSION + 1) {
            Err(Error::AbiVersion { version, max, .. }) => {
                assert_eq!(version, LANGUAGE_VERSION + 1);
                assert_eq!(max, LANGUAGE_VERSION);
            }
            other => panic!("expected ABI error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_builtin_grammar() {
        let language = load_language().expect("Error loading Sea grammar");
        assert!(language.node_kind_count() > 0);
        assert!(verify_language(&language).is_ok());
    }

    #[test]
    fn test_repeated_loads_are_identical() {
        let first = load_language().expect("Error loading Sea grammar");
        for _ in 0..64 {
            let again = load_language().expect("Error loading Sea grammar");
            assert_eq!(again.version(), first.version());
            assert_eq!(again.node_kind_count(), first.node_kind_count());
            assert_eq!(
                again.id_for_node_kind("top_fun", true),
                first.id_for_node_kind("top_fun", true)
            );
        }
    }

    #[test]
    fn test_missing_library() {
        let err = load_language_from_library(Path::new("does/not/exist/libtree-sitter-sea.so")).unwrap_err();
        assert!(matches!(err, Error::Library(_)));
        assert!(err.is_load_failure());
    }

    #[test]
    fn test_corrupted_library_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(default_library_name());
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"definitely not a shared object\0\x7fELF garbage").unwrap();
        drop(file);

        let err = load_language_from_library(&path).unwrap_err();
        assert!(err.is_load_failure());
        assert!(err.to_string().starts_with(crate::LOAD_ERROR_MESSAGE));
    }

    unsafe extern "C" fn null_constructor() -> *const () {
        std::ptr::null()
    }

    #[test]
    fn test_null_handle_is_rejected() {
        // SAFETY: the constructor takes no arguments and returns a pointer.
        let builder = unsafe { LanguageFn::from_raw(null_constructor) };
        let err = language_from_fn(builder).unwrap_err();
        assert!(matches!(err, Error::GrammarLoad(_)));
        assert!(err.is_load_failure());
        assert!(err.to_string().starts_with(crate::LOAD_ERROR_MESSAGE));
        assert!(err.to_string().contains("null language handle"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_library_without_symbol_is_reported() {
        // Any real shared object lacking the constructor will do.
        let candidates = [
            "/lib/x86_64-linux-gnu/libc.so.6",
            "/lib/aarch64-linux-gnu/libc.so.6",
            "/usr/lib64/libc.so.6",
            "/lib64/libc.so.6",
            "/usr/lib/libc.so.6",
        ];
        let Some(libc) = candidates.iter().map(Path::new).find(|p| p.is_file()) else {
            return;
        };

        let err = load_language_from_library(libc).unwrap_err();
        assert!(matches!(err, Error::Library(_)));
        assert!(err.to_string().contains(LANGUAGE_SYMBOL));
        assert!(err.to_string().starts_with(crate::LOAD_ERROR_MESSAGE));
    }

    #[test]
    fn test_library_name() {
        let name = default_library_name();
        assert!(name.contains("tree-sitter-sea"));
    }
}
