use crate::command::{CommandKind, CommandRecord, SurfaceHandle};
use crate::gamepad::{AxisCodec, GamepadStick};

/// Engine-side reaction to host commands.
///
/// Every method defaults to a no-op, so an engine only implements what it
/// consumes. All calls happen on the engine thread inside
/// `HostBridge::drain_and_dispatch`.
pub trait CommandHandler {
    fn key_down(&mut self, _code: i32) {}
    fn key_up(&mut self, _code: i32) {}
    fn key_char(&mut self, _unicode: i32) {}

    /// Whole current text of the host-side editable field.
    fn text_changed(&mut self, _text: &str) {}

    fn pointer_down(&mut self, _id: i32, _x: i32, _y: i32, _is_mouse: bool) {}
    fn pointer_up(&mut self, _id: i32, _x: i32, _y: i32, _is_mouse: bool) {}
    fn pointer_move(&mut self, _id: i32, _x: i32, _y: i32, _is_mouse: bool) {}

    fn gamepad_axis(&mut self, _stick: GamepadStick, _x: f32, _y: f32) {}

    fn surface_created(&mut self, _surface: &SurfaceHandle, _width: i32, _height: i32) {}

    /// Stop every use of the current surface before returning: the host
    /// frees it as soon as the bridge signals teardown complete.
    fn surface_destroyed(&mut self) {}
    fn surface_resized(&mut self, _width: i32, _height: i32) {}
    fn surface_redraw_needed(&mut self) {}

    fn app_start(&mut self) {}
    fn app_stop(&mut self) {}
    fn app_resume(&mut self) {}
    fn app_pause(&mut self) {}
    fn app_destroy(&mut self) {}

    fn focus_gained(&mut self) {}
    fn focus_lost(&mut self) {}
    fn low_memory(&mut self) {}

    fn open_dialog_result(&mut self, _path: &str) {}
    fn save_dialog_result(&mut self, _path: &str) {}

    fn ui_created(&mut self) {}
    fn ui_clicked(&mut self, _widget: i32) {}
    fn ui_changed(&mut self, _widget: i32, _value: i32) {}
    fn ui_string(&mut self, _widget: i32, _text: &str) {}
}

/// Route one record to its handler method.
///
/// Returns the decoded kind, or `None` for an unknown code (ignored).
pub fn dispatch(
    rec: &CommandRecord,
    handler: &mut dyn CommandHandler,
    axes: &AxisCodec,
) -> Option<CommandKind> {
    let Some(kind) = rec.kind() else {
        log::trace!(target: "bridge", "ignoring unknown command code {}", rec.code());
        return None;
    };

    let [a1, a2, a3, a4] = rec.args();
    let text = rec.text().unwrap_or("");

    match kind {
        CommandKind::KeyDown => handler.key_down(a1),
        CommandKind::KeyUp => handler.key_up(a1),
        CommandKind::KeyChar => handler.key_char(a1),
        CommandKind::TextChanged => handler.text_changed(text),

        CommandKind::PointerDown => handler.pointer_down(a1, a2, a3, a4 != 0),
        CommandKind::PointerUp => handler.pointer_up(a1, a2, a3, a4 != 0),
        CommandKind::PointerMove => handler.pointer_move(a1, a2, a3, a4 != 0),

        CommandKind::GamepadAxisLeft => {
            handler.gamepad_axis(GamepadStick::Left, axes.decode(a1), axes.decode(a2))
        }
        CommandKind::GamepadAxisRight => {
            handler.gamepad_axis(GamepadStick::Right, axes.decode(a1), axes.decode(a2))
        }

        CommandKind::SurfaceCreated => match rec.surface() {
            Some(surface) => handler.surface_created(surface, a1, a2),
            None => log::warn!(target: "bridge", "surface-created without a surface handle, ignored"),
        },
        CommandKind::SurfaceDestroyed => handler.surface_destroyed(),
        CommandKind::SurfaceResized => handler.surface_resized(a1, a2),
        CommandKind::SurfaceRedrawNeeded => handler.surface_redraw_needed(),

        CommandKind::AppStart => handler.app_start(),
        CommandKind::AppStop => handler.app_stop(),
        CommandKind::AppResume => handler.app_resume(),
        CommandKind::AppPause => handler.app_pause(),
        CommandKind::AppDestroy => handler.app_destroy(),

        CommandKind::FocusGained => handler.focus_gained(),
        CommandKind::FocusLost => handler.focus_lost(),
        CommandKind::LowMemory => handler.low_memory(),

        CommandKind::OpenDialogResult => handler.open_dialog_result(text),
        CommandKind::SaveDialogResult => handler.save_dialog_result(text),

        CommandKind::UiCreated => handler.ui_created(),
        CommandKind::UiClicked => handler.ui_clicked(a1),
        CommandKind::UiChanged => handler.ui_changed(a1, a2),
        CommandKind::UiString => handler.ui_string(a1, text),
    }

    Some(kind)
}
