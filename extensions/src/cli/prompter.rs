use async_trait::async_trait;

use notefiler_core::prompt::{PromptError, Prompter};
use nu_ansi_term::{Color, Style};
use reedline::{
    default_emacs_keybindings, ColumnarMenu, Completer, DefaultPrompt, DefaultPromptSegment, EditCommand,
    Emacs, Highlighter, KeyCode, KeyModifiers, MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu, Signal,
    Span, StyledText, Suggestion,
};

/// Line-editor based [`Prompter`] for terminals.
///
/// Every edit starts pre-filled with the suggested value. TAB opens a menu of the
/// offered completions, ESC or Ctrl-C cancels the whole review.
#[derive(Debug, Default, Clone)]
pub struct ConsolePrompter;

impl ConsolePrompter {
    pub fn new() -> Self {
        ConsolePrompter
    }

    fn line_editor(completions: &[String]) -> Reedline {
        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu("completion_menu".to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );
        keybindings.add_binding(KeyModifiers::NONE, KeyCode::Esc, ReedlineEvent::CtrlC);

        let completion_menu = Box::new(ColumnarMenu::default().with_name("completion_menu"));
        Reedline::create()
            .with_completer(Box::new(FolderCompleter::new(completions.to_vec())))
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_edit_mode(Box::new(Emacs::new(keybindings)))
            .with_highlighter(Box::new(KnownValueHighlighter { known: completions.to_vec() }))
    }

    fn prompt(label: &str) -> DefaultPrompt {
        DefaultPrompt {
            left_prompt: DefaultPromptSegment::Basic(label.to_string()),
            right_prompt: DefaultPromptSegment::Empty,
        }
    }
}

/// Reads one line; Ctrl-C, Ctrl-D and ESC all mean cancel.
fn read_line(line_editor: &mut Reedline, prompt: &DefaultPrompt) -> Result<String, PromptError> {
    match line_editor.read_line(prompt) {
        Ok(Signal::Success(line)) => Ok(line),
        Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => Err(PromptError::Canceled),
        Err(err) => Err(PromptError::Io(err)),
    }
}

fn parse_yes_no(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl Prompter for ConsolePrompter {
    async fn edit(&self, label: &str, default: &str, completions: &[String]) -> Result<String, PromptError> {
        let mut line_editor = Self::line_editor(completions);
        line_editor.run_edit_commands(&[EditCommand::InsertString(default.to_string())]);
        let prompt = Self::prompt(label);

        let line = tokio::task::spawn_blocking(move || read_line(&mut line_editor, &prompt)).await??;
        Ok(line.trim().to_string())
    }

    async fn confirm(&self, summary: &str) -> Result<bool, PromptError> {
        let mut line_editor = Self::line_editor(&[]);
        let prompt = Self::prompt(&format!("{} [y/N]", summary));

        let answer = tokio::task::spawn_blocking(move || read_line(&mut line_editor, &prompt)).await??;
        Ok(parse_yes_no(&answer))
    }
}

/// Offers the known values that start with what has been typed so far.
struct FolderCompleter {
    values: Vec<String>,
}

impl FolderCompleter {
    fn new(values: Vec<String>) -> Self {
        FolderCompleter { values }
    }
}

impl Completer for FolderCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let typed = line[..pos].trim_start().to_lowercase();
        let start = pos - line[..pos].trim_start().len();
        self.values.iter()
            .filter(|value| value.to_lowercase().starts_with(&typed))
            .map(|value| Suggestion {
                value: value.clone(),
                description: None,
                style: None,
                extra: None,
                span: Span { start, end: pos },
                append_whitespace: false,
            })
            .collect()
    }
}

/// Shows the line in cyan once it matches one of the offered values.
struct KnownValueHighlighter {
    known: Vec<String>,
}

impl Highlighter for KnownValueHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let style = if self.known.iter().any(|k| k == line.trim()) {
            Style { foreground: Some(Color::Cyan), ..Default::default() }
        } else {
            Style::default()
        };
        StyledText { buffer: vec![(style, line.to_string())] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> Vec<String> {
        ["proj/notes", "proj/ideas", "personal"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn completes_by_prefix() {
        let mut completer = FolderCompleter::new(values());
        let found: Vec<String> = completer.complete("proj/", 5).into_iter().map(|s| s.value).collect();
        assert_eq!(found, ["proj/notes", "proj/ideas"]);
    }

    #[test]
    fn completion_replaces_typed_text() {
        let mut completer = FolderCompleter::new(values());
        let suggestions = completer.complete("  PER", 5);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].value, "personal");
        assert_eq!(suggestions[0].span, Span { start: 2, end: 5 });
    }

    #[test]
    fn empty_line_offers_everything() {
        let mut completer = FolderCompleter::new(values());
        assert_eq!(completer.complete("", 0).len(), 3);
    }

    #[test]
    fn highlights_known_values_only() {
        let highlighter = KnownValueHighlighter { known: values() };
        let known = highlighter.highlight("proj/notes", 10);
        assert_eq!(known.buffer[0].0.foreground, Some(Color::Cyan));
        let unknown = highlighter.highlight("proj/new", 8);
        assert_eq!(unknown.buffer[0].0.foreground, None);
    }

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(parse_yes_no("y"));
        assert!(parse_yes_no(" YES "));
        assert!(!parse_yes_no(""));
        assert!(!parse_yes_no("no"));
        assert!(!parse_yes_no("sure"));
    }
}
