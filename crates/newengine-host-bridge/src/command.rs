use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Host notification kinds.
///
/// Codes are stable: hosts that forward raw integers (JNI, FFI shims) use
/// [`CommandKind::code`] / [`CommandKind::from_code`]. Code 17 is reserved
/// (configuration changed) and is never produced.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u16)]
pub enum CommandKind {
    KeyDown = 0,
    KeyUp = 1,
    KeyChar = 2,
    PointerDown = 3,
    PointerUp = 4,
    PointerMove = 5,

    SurfaceCreated = 6,
    SurfaceDestroyed = 7,
    SurfaceResized = 8,
    SurfaceRedrawNeeded = 9,

    AppStart = 10,
    AppStop = 11,
    AppResume = 12,
    AppPause = 13,
    AppDestroy = 14,

    FocusGained = 15,
    FocusLost = 16,
    LowMemory = 18,

    TextChanged = 19,
    OpenDialogResult = 20,

    UiCreated = 21,
    UiClicked = 22,
    UiChanged = 23,
    UiString = 24,

    GamepadAxisLeft = 25,
    GamepadAxisRight = 26,

    SaveDialogResult = 27,
}

impl CommandKind {
    pub const ALL: [CommandKind; 27] = [
        CommandKind::KeyDown,
        CommandKind::KeyUp,
        CommandKind::KeyChar,
        CommandKind::PointerDown,
        CommandKind::PointerUp,
        CommandKind::PointerMove,
        CommandKind::SurfaceCreated,
        CommandKind::SurfaceDestroyed,
        CommandKind::SurfaceResized,
        CommandKind::SurfaceRedrawNeeded,
        CommandKind::AppStart,
        CommandKind::AppStop,
        CommandKind::AppResume,
        CommandKind::AppPause,
        CommandKind::AppDestroy,
        CommandKind::FocusGained,
        CommandKind::FocusLost,
        CommandKind::LowMemory,
        CommandKind::TextChanged,
        CommandKind::OpenDialogResult,
        CommandKind::UiCreated,
        CommandKind::UiClicked,
        CommandKind::UiChanged,
        CommandKind::UiString,
        CommandKind::GamepadAxisLeft,
        CommandKind::GamepadAxisRight,
        CommandKind::SaveDialogResult,
    ];

    #[inline]
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.code() == code)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CommandKind::KeyDown => "key-down",
            CommandKind::KeyUp => "key-up",
            CommandKind::KeyChar => "key-char",
            CommandKind::PointerDown => "pointer-down",
            CommandKind::PointerUp => "pointer-up",
            CommandKind::PointerMove => "pointer-move",
            CommandKind::SurfaceCreated => "surface-created",
            CommandKind::SurfaceDestroyed => "surface-destroyed",
            CommandKind::SurfaceResized => "surface-resized",
            CommandKind::SurfaceRedrawNeeded => "surface-redraw-needed",
            CommandKind::AppStart => "app-start",
            CommandKind::AppStop => "app-stop",
            CommandKind::AppResume => "app-resume",
            CommandKind::AppPause => "app-pause",
            CommandKind::AppDestroy => "app-destroy",
            CommandKind::FocusGained => "focus-gained",
            CommandKind::FocusLost => "focus-lost",
            CommandKind::LowMemory => "low-memory",
            CommandKind::TextChanged => "text-changed",
            CommandKind::OpenDialogResult => "open-dialog-result",
            CommandKind::UiCreated => "ui-created",
            CommandKind::UiClicked => "ui-clicked",
            CommandKind::UiChanged => "ui-changed",
            CommandKind::UiString => "ui-string",
            CommandKind::GamepadAxisLeft => "gamepad-axis-left",
            CommandKind::GamepadAxisRight => "gamepad-axis-right",
            CommandKind::SaveDialogResult => "save-dialog-result",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque reference to a host rendering surface.
///
/// The host assigns the id; the engine may downcast to the concrete host type
/// (e.g. a winit window) to attach its renderer.
#[derive(Clone)]
pub struct SurfaceHandle {
    id: u64,
    inner: Arc<dyn Any + Send + Sync>,
}

impl SurfaceHandle {
    #[inline]
    pub fn new<T: Any + Send + Sync>(id: u64, surface: T) -> Self {
        Self { id, inner: Arc::new(surface) }
    }

    #[inline]
    pub fn from_arc<T: Any + Send + Sync>(id: u64, surface: Arc<T>) -> Self {
        Self { id, inner: surface }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Strong references held across host and engine (diagnostics only).
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl fmt::Debug for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceHandle").field("id", &self.id).finish()
    }
}

impl PartialEq for SurfaceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Payload carried by one command. Which fields matter depends on the kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub args: [i32; 4],
    pub text: Option<String>,
    pub surface: Option<SurfaceHandle>,
}

impl Payload {
    #[inline]
    pub const fn empty() -> Self {
        Self { args: [0; 4], text: None, surface: None }
    }

    #[inline]
    pub const fn int(a1: i32) -> Self {
        Self { args: [a1, 0, 0, 0], text: None, surface: None }
    }

    #[inline]
    pub const fn int2(a1: i32, a2: i32) -> Self {
        Self { args: [a1, a2, 0, 0], text: None, surface: None }
    }

    #[inline]
    pub const fn int4(a1: i32, a2: i32, a3: i32, a4: i32) -> Self {
        Self { args: [a1, a2, a3, a4], text: None, surface: None }
    }

    #[inline]
    pub fn text(text: impl Into<String>) -> Self {
        Self { args: [0; 4], text: Some(text.into()), surface: None }
    }

    #[inline]
    pub fn int_text(a1: i32, text: impl Into<String>) -> Self {
        Self { args: [a1, 0, 0, 0], text: Some(text.into()), surface: None }
    }

    #[inline]
    pub fn surface(handle: SurfaceHandle, width: u32, height: u32) -> Self {
        Self {
            args: [clamp_dim(width), clamp_dim(height), 0, 0],
            text: None,
            surface: Some(handle),
        }
    }

    #[inline]
    pub fn size(width: u32, height: u32) -> Self {
        Self::int2(clamp_dim(width), clamp_dim(height))
    }
}

#[inline]
fn clamp_dim(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Pooled record moved from the host thread to the engine thread.
///
/// Owned by exactly one of: free pool, pending queue, the dispatch in flight.
#[derive(Debug, Default)]
pub struct CommandRecord {
    code: u16,
    args: [i32; 4],
    text: Option<String>,
    surface: Option<SurfaceHandle>,
}

impl CommandRecord {
    #[inline]
    pub(crate) fn fill(&mut self, code: u16, payload: Payload) {
        self.code = code;
        self.args = payload.args;
        self.text = payload.text;
        self.surface = payload.surface;
    }

    /// Clears every field so a recycled record never carries a previous
    /// command's string or surface reference.
    #[inline]
    pub(crate) fn reset(&mut self) {
        self.code = 0;
        self.args = [0; 4];
        self.text = None;
        self.surface = None;
    }

    #[inline]
    pub fn code(&self) -> u16 {
        self.code
    }

    #[inline]
    pub fn kind(&self) -> Option<CommandKind> {
        CommandKind::from_code(self.code)
    }

    #[inline]
    pub fn arg(&self, index: usize) -> i32 {
        self.args.get(index).copied().unwrap_or(0)
    }

    #[inline]
    pub fn args(&self) -> [i32; 4] {
        self.args
    }

    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    #[inline]
    pub fn surface(&self) -> Option<&SurfaceHandle> {
        self.surface.as_ref()
    }
}
