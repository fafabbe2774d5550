//! In-process minification for plain assets.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Other extensions pass
//! through untouched.

use std::path::Path;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier as OxcMinifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::{Minified, Minifier, MinifyOptions};
use crate::core::BuildError;
use crate::core::path::is_stylesheet;

/// oxc + lightningcss minifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeMinifier;

impl Minifier for NativeMinifier {
    fn minify(
        &self,
        path: &Path,
        source: &str,
        options: &MinifyOptions,
    ) -> Result<Minified, BuildError> {
        if is_stylesheet(path) {
            return minify_css(path, source);
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        match ext {
            "js" | "mjs" | "cjs" => minify_js(path, source, options),
            _ => {
                crate::debug!("minify"; "no minifier for {}, copying", path.display());
                Ok(Minified {
                    code: source.to_owned(),
                    map: None,
                })
            }
        }
    }
}

/// Minify JavaScript source code.
fn minify_js(path: &Path, source: &str, options: &MinifyOptions) -> Result<Minified, BuildError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type(path)).parse();
    if !ret.errors.is_empty() {
        let detail = ret
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        return Err(BuildError::backend(path, detail));
    }

    let mut program = ret.program;
    let minifier_options = MinifierOptions {
        mangle: options.mangle.then(MangleOptions::default),
        compress: Some(CompressOptions {
            drop_console: options.drop_console,
            drop_debugger: options.drop_debugger,
            ..CompressOptions::smallest()
        }),
    };
    let ret = OxcMinifier::new(minifier_options).minify(&allocator, &mut program);

    let output = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            source_map_path: options.source_map.then(|| path.to_path_buf()),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program);

    let map = output.map.map(|map| map.to_json_string());
    let mut code = output.code;
    if map.is_some() {
        code.push_str(&source_mapping_url(path));
    }
    Ok(Minified { code, map })
}

/// Plain assets are classic scripts: their top-level bindings are globals
/// and must survive compression. `.mjs` and `.cjs` keep their module scope.
fn source_type(path: &Path) -> SourceType {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mjs") => SourceType::mjs(),
        Some("cjs") => SourceType::cjs(),
        _ => SourceType::script(),
    }
}

/// Minify CSS source code.
fn minify_css(path: &Path, source: &str) -> Result<Minified, BuildError> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| BuildError::backend(path, e.to_string()))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| BuildError::backend(path, e.to_string()))?;
    Ok(Minified {
        code: result.code,
        map: None,
    })
}

/// `//# sourceMappingURL=` trailer pointing at the `.map` next to the output.
fn source_mapping_url(source: &Path) -> String {
    let output = crate::core::path::output_path_of(source);
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("\n//# sourceMappingURL={name}.map\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> MinifyOptions {
        MinifyOptions {
            drop_console: true,
            drop_debugger: true,
            mangle: false,
            source_map: false,
        }
    }

    #[test]
    fn test_minify_js_shrinks_and_drops_console() {
        let source = "function greet(name) {\n    console.log('hi', name);\n    return 'hello ' + name;\n}\nwindow.greet = greet;\n";
        let out = NativeMinifier
            .minify(Path::new("app.js"), source, &opts())
            .unwrap();
        assert!(out.code.len() < source.len());
        assert!(!out.code.contains("console"));
        assert!(out.map.is_none());
    }

    #[test]
    fn test_minify_js_keeps_top_level_globals() {
        let source = "function greet(name) { return 'hi ' + name; }\nvar counter = 0;\n";
        let out = NativeMinifier
            .minify(Path::new("legacy.js"), source, &opts())
            .unwrap();
        assert!(out.code.contains("greet"), "{}", out.code);
        assert!(out.code.contains("counter"), "{}", out.code);
    }

    #[test]
    fn test_source_type_by_extension() {
        assert!(source_type(Path::new("a.mjs")).is_module());
        assert!(source_type(Path::new("a.js")).is_script());
        assert!(source_type(Path::new("a.cjs")).is_commonjs());
    }

    #[test]
    fn test_minify_js_parse_error_is_backend_failure() {
        let err = NativeMinifier
            .minify(Path::new("broken.js"), "function (", &opts())
            .unwrap_err();
        assert!(matches!(err, BuildError::Backend { .. }));
    }

    #[test]
    fn test_minify_js_with_source_map() {
        let options = MinifyOptions {
            source_map: true,
            ..opts()
        };
        let out = NativeMinifier
            .minify(Path::new("dir/app.js"), "var answer = 40 + 2;\nwindow.a = answer;\n", &options)
            .unwrap();
        assert!(out.map.is_some());
        assert!(out.code.contains("sourceMappingURL=app.min.js.map"));
    }

    #[test]
    fn test_minify_css() {
        let source = ".a {\n  color: red;\n}\n";
        let out = NativeMinifier
            .minify(Path::new("x.css"), source, &opts())
            .unwrap();
        assert_eq!(out.code, ".a{color:red}");
    }

    #[test]
    fn test_unknown_extension_passes_through() {
        let out = NativeMinifier
            .minify(Path::new("notes.txt"), "keep   me", &opts())
            .unwrap();
        assert_eq!(out.code, "keep   me");
    }
}
