/*
 *  testutil.rs
 *
 *  weatherboard - e-paper weather dashboard
 *
 *  Shared helpers for unit tests.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::path::Path;

use crate::canvas::FontStore;

/// Loads a FontStore for tests: the bundled Roboto faces when present,
/// otherwise a common system font standing in for all three weights.
/// Returns None when no usable font exists so tests can skip instead of
/// failing on a bare CI image.
pub fn find_test_fonts() -> Option<FontStore> {
    if let Ok(fonts) = FontStore::load(Path::new("assets")) {
        return Some(fonts);
    }
    let candidates = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial Unicode.ttf",
    ];
    for path in candidates {
        let path = Path::new(path);
        if path.exists() {
            if let Ok(fonts) = FontStore::from_files(path, path, path) {
                return Some(fonts);
            }
        }
    }
    None
}
