// Copyright (c) 2025 - Cowboy AI, Inc.

mod codec_roundtrip;
mod layout_import;
