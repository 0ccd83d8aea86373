/// The distinguished "this alternative doesn't apply" signal, kept separate
/// from a committed syntax error. A production returns `Ok(Alt::NoMatch)`
/// when its leading tokens don't even look like this alternative (the
/// caller is free to try another), and `Err(_)` only once it has committed
/// and a required token is missing.
pub enum Alt<T> {
    Matched(T),
    NoMatch,
}
