// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `qpool sizes` command: the per-element estimates used for accounting.

use query_pool::ElementKind;

pub fn execute() -> anyhow::Result<()> {
    println!("  {:<8} {:>8}", "Kind", "Bytes");
    println!("  {}", "-".repeat(17));
    for kind in ElementKind::ALL {
        println!("  {:<8} {:>8}", kind.as_str(), kind.element_size());
    }
    Ok(())
}
