use std::io::Write;

use crate::cursor;
use crate::error::Result;
use crate::geometry::Rect;
use crate::registry::{ZoneId, ZoneState};
use crate::width::display_width;

/// Renderer runtime parameters.
#[derive(Debug, Clone, Default)]
pub struct RendererSettings {
    pub restore_cursor: Option<(u16, u16)>,
}

/// ANSI escape code renderer writing directly to a terminal handle.
pub struct AnsiRenderer {
    settings: RendererSettings,
}

impl AnsiRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self { settings }
    }

    pub fn with_default() -> Self {
        Self::new(RendererSettings::default())
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    pub fn render(&mut self, writer: &mut impl Write, dirty: &[(ZoneId, ZoneState)]) -> Result<()> {
        for (_id, state) in dirty {
            render_zone(writer, state)?;
        }

        if let Some((row, col)) = self.settings.restore_cursor {
            write!(writer, "{}", cursor::move_to(row + 1, col + 1))?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn render_zone(writer: &mut impl Write, state: &ZoneState) -> Result<()> {
    let Rect {
        x,
        y,
        width,
        height,
    } = state.rect;

    if width == 0 || height == 0 {
        return Ok(());
    }

    let mut lines = if state.pre_rendered {
        state.content.lines().map(str::to_string).collect::<Vec<_>>()
    } else {
        wrap_to_width(&state.content, width)
    };

    lines.truncate(height as usize);
    while lines.len() < height as usize {
        lines.push(String::new());
    }

    for (offset, line) in lines.iter_mut().enumerate() {
        pad_line(line, width);
        write!(writer, "{}", cursor::move_to(y + offset as u16 + 1, x + 1))?;
        write!(writer, "{}", line)?;
    }

    Ok(())
}

fn wrap_to_width(content: &str, width: u16) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for raw in content.split('\n') {
        if raw.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for ch in raw.chars() {
            if current.is_empty() && ch == ' ' {
                continue;
            }
            current.push(ch);
            let display = display_width(&current) as u16;
            if display > width {
                current.pop();
                lines.push(std::mem::take(&mut current).trim_start().to_string());
                current.push(ch);
            } else if display == width {
                lines.push(std::mem::take(&mut current).trim_start().to_string());
            }
        }

        if !current.is_empty() {
            lines.push(current.trim_start().to_string());
        }
    }

    lines
}

fn pad_line(line: &mut String, width: u16) {
    let mut display = display_width(line) as u16;
    while display < width {
        line.push(' ');
        display += 1;
    }

    if display > width {
        while (display_width(line) as u16) > width {
            line.pop();
        }
        while (display_width(line) as u16) < width {
            line.push(' ');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ZoneRegistry;
    use std::collections::HashMap;

    fn dirty_zone(content: &str, pre_rendered: bool, rect: Rect) -> Vec<(ZoneId, ZoneState)> {
        let mut registry = ZoneRegistry::new();
        let mut solved = HashMap::new();
        solved.insert("zone".to_string(), rect);
        registry.sync_layout(&solved);
        registry.take_dirty();
        if pre_rendered {
            registry
                .apply_pre_rendered(&"zone".to_string(), content.to_string())
                .unwrap();
        } else {
            registry
                .apply_content(&"zone".to_string(), content.to_string())
                .unwrap();
        }
        registry.take_dirty()
    }

    #[test]
    fn wrap_basic() {
        let lines = wrap_to_width("hello world", 5);
        assert_eq!(lines, vec!["hello".to_string(), "world".to_string()]);
    }

    #[test]
    fn renderer_writes_cursor_sequences() {
        let dirty = dirty_zone("hi", false, Rect::new(2, 3, 5, 2));
        let mut output = Vec::new();
        let mut renderer = AnsiRenderer::with_default();
        renderer.render(&mut output, &dirty).unwrap();

        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("\u{1b}[4;3Hhi"));
        assert!(rendered.contains("\u{1b}[5;3H"));
    }

    #[test]
    fn pre_rendered_lines_keep_leading_spaces() {
        let dirty = dirty_zone("  ┌─┐\n  └─┘", true, Rect::new(0, 0, 6, 2));
        let mut output = Vec::new();
        let mut renderer = AnsiRenderer::with_default();
        renderer.render(&mut output, &dirty).unwrap();

        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("  ┌─┐"));
        assert!(rendered.contains("  └─┘"));
    }
}
