//! Syntax highlighting for code blocks.
//!
//! Wraps syntect's classed-HTML generator: highlighted code is emitted as
//! `<span class="hl-…">` runs and coloured by the stylesheet produced by
//! [`theme_css`]. One extra grammar, `Bash-Args`, is registered on top of
//! syntect's defaults and used for `bash` blocks, which in tutorials are
//! nearly always single command invocations rather than scripts.

use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxDefinition, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::HighlightError;
use crate::markdown::html_escape;

/// Prefix applied to every generated scope class.
pub const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Name of the command-line grammar registered by [`Highlighter::new`].
pub const COMMAND_GRAMMAR_NAME: &str = "Bash-Args";

/// Command-line invocation grammar: command, subcommand, flags, quoted
/// strings, numbers and `#` comments.
const COMMAND_GRAMMAR: &str = r#"%YAML 1.2
---
name: Bash-Args
scope: source.shell.args
contexts:
  main:
    - include: comments
    - match: '^[A-Za-z0-9_.\-]+'
      scope: support.function.builtin.shell
      push: subcommand
    - include: arguments

  subcommand:
    - match: '[ \t]+(?=-)'
      pop: true
    - match: '[ \t]+([A-Za-z0-9_.\-]+)'
      captures:
        1: entity.name.function.shell
      pop: true
    - match: '(?=\S|\n)'
      pop: true

  arguments:
    - match: '--[A-Za-z0-9_\-]+\b|-[A-Za-z]\b'
      scope: variable.parameter.option.shell
    - match: '"'
      scope: punctuation.definition.string.begin.shell
      push: double_quoted
    - match: "'"
      scope: punctuation.definition.string.begin.shell
      push: single_quoted
    - match: '\b[0-9]+(?:\.[0-9]+)?\b'
      scope: constant.numeric.shell

  double_quoted:
    - meta_scope: string.quoted.double.shell
    - match: '\\.'
      scope: constant.character.escape.shell
    - match: '"'
      scope: punctuation.definition.string.end.shell
      pop: true

  single_quoted:
    - meta_scope: string.quoted.single.shell
    - match: "'"
      scope: punctuation.definition.string.end.shell
      pop: true

  comments:
    - match: '#.*'
      scope: comment.line.number-sign.shell
"#;

/// Highlights code blocks to classed HTML.
pub struct Highlighter {
    syntax_set: SyntaxSet,
}

impl Highlighter {
    /// syntect's default syntaxes plus the command-line grammar.
    pub fn new() -> Result<Self, HighlightError> {
        let grammar = SyntaxDefinition::load_from_str(COMMAND_GRAMMAR, true, None).map_err(|e| {
            HighlightError::Grammar {
                name: COMMAND_GRAMMAR_NAME,
                message: e.to_string(),
            }
        })?;
        let mut builder = SyntaxSet::load_defaults_newlines().into_builder();
        builder.add(grammar);
        Ok(Self {
            syntax_set: builder.build(),
        })
    }

    /// syntect's default syntaxes only.
    pub fn defaults() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Grammar used for a fence language, if any is known.
    fn syntax_for(&self, language: &str) -> Option<&SyntaxReference> {
        if language.eq_ignore_ascii_case("bash") {
            if let Some(syntax) = self.syntax_set.find_syntax_by_name(COMMAND_GRAMMAR_NAME) {
                return Some(syntax);
            }
        }
        self.syntax_set.find_syntax_by_token(language)
    }

    /// Highlight `code` as `language`, returning the inner HTML for its
    /// `<code>` element. Unknown or missing languages produce escaped plain
    /// text.
    pub fn highlight(&self, language: Option<&str>, code: &str) -> String {
        let Some(syntax) = language.and_then(|lang| self.syntax_for(lang)) else {
            return html_escape(code);
        };

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                log::warn!("[highlight] syntax={} error={e}", syntax.name);
                return html_escape(code);
            }
        }
        generator.finalize()
    }
}

/// Stylesheet for the classes [`Highlighter`] emits, from one of syntect's
/// bundled themes (e.g. `InspiredGitHub`). `None` for an unknown theme.
pub fn theme_css(theme_name: &str) -> Option<String> {
    let themes = ThemeSet::load_defaults();
    let theme = themes.themes.get(theme_name)?;
    match css_for_theme_with_class_style(theme, CLASS_STYLE) {
        Ok(css) => Some(css),
        Err(e) => {
            log::warn!("[highlight] theme={theme_name} css-error={e}");
            None
        }
    }
}
