pub mod deriv;
pub mod notifier;
pub mod telegram;
