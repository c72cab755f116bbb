//! The terminal-rendering widget, as seen from the bridge.

use async_trait::async_trait;
use termlink_common::{Geometry, InputEvent, OutputChunk};
use tokio::sync::mpsc;

#[async_trait]
pub trait TerminalView: Send + Sync + 'static {
    /// Hand backend output to the view. Resolves once the view has
    /// processed and committed the chunk.
    async fn feed(&self, chunk: OutputChunk) -> Result<(), String>;

    /// Show a diagnostic or status line.
    fn writeln(&self, text: &str);

    /// Best-fit grid for the current pixel size and font metrics, or `None`
    /// if the view can't be measured yet.
    fn measure_and_fit(&self) -> Option<Geometry>;

    /// Stream of raw user input, in emission order.
    fn subscribe_input(&self) -> mpsc::UnboundedReceiver<InputEvent>;

    /// One `()` per display-surface resize.
    fn subscribe_resize(&self) -> mpsc::UnboundedReceiver<()>;

    /// Apply a font size preference. Views without fonts ignore it.
    fn set_font_size(&self, _size: u32) {}
}
