// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use sources_console::status::aggregate_status;
use sources_console::types::{Catalogs, Source, Status};
use sources_console::view::{project, ViewParameters};

fuzz_target!(|data: &[u8]| {
    let Ok(sources) = serde_json::from_slice::<Vec<Source>>(data) else {
        return;
    };

    for source in &sources {
        let report = aggregate_status(source);
        if report.status == Status::Available || report.status == Status::InProgress {
            assert!(report.errors.is_empty());
        }
    }

    let projection = project(&sources, &ViewParameters::default(), &Catalogs::default());
    assert_eq!(projection.total_filtered, sources.len());
});
