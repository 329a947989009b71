// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk Print: queue inspection and clearing, USB port cycling and
// default-printer assignment on top of the spooler bridge, plus the
// single-worker dispatcher front ends use to run them.

pub mod controller;
pub mod dispatch;
pub mod ports;

pub use controller::{QueueController, choose_printer};
pub use dispatch::{ActionDispatcher, ActionOutcome, QueueAction};
