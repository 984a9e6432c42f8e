//! Raw events produced by the window backend, before translation into
//! engine messages.

/// Keys we route through the message bus. The set mirrors what the layers
/// react to; unmapped backend keys are dropped at the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Escape,
    Return,
    Tab,
    Space,
    Back,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    LShift,
    RShift,
    LControl,
    RControl,
    LAlt,
    RAlt,
    Minus,
    Equals,
    Grave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u8),
}

/// A backend event in engine-canonical shape. Translators turn these into
/// messages before dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEvent {
    CloseRequested,
    Resized(u32, u32),
    Focused(bool),
    KeyboardInput { key: Key, pressed: bool },
    ReceivedCharacter(char),
    CursorMoved { x: f32, y: f32 },
    MouseInput { button: MouseButton, pressed: bool },
    MouseWheel { delta: f32 },
}
