// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::comment::RatedComment;

const HEADER: [&str; 3] = ["text", "quality", "difficulty"];

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn push_field(out: &mut String, field: &str) {
    if needs_quotes(field) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// 将评分表写成 CSV 文本（含表头，CRLF 换行）
pub fn to_csv(rows: &[RatedComment]) -> String {
    let mut out = HEADER.join(",");
    out.push_str("\r\n");

    for row in rows {
        push_field(&mut out, &row.text);
        out.push(',');
        out.push_str(&row.quality.to_string());
        out.push(',');
        out.push_str(&row.difficulty.to_string());
        out.push_str("\r\n");
    }

    out
}
