//! Result and history presenter
//!
//! Pure functions from session state to HTML. Everything user-controlled
//! (file names, labels, error messages) passes through [`escape_html`].

use qiraat_common::time::format_timestamp;
use qiraat_common::{History, Outcome, OutcomeRecord};

use crate::session::SessionView;
use crate::waveform::PlaybackState;

/// CDN build of the browser waveform renderer
pub const WAVESURFER_SCRIPT_URL: &str = "https://unpkg.com/wavesurfer.js@7/dist/wavesurfer.min.js";

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Short summary used in history rows: `Gagal` or `label (P%)`
pub fn history_summary(record: &OutcomeRecord) -> String {
    match &record.outcome {
        Outcome::Success(prediction) => {
            format!("{} ({}%)", prediction.label, prediction.percent())
        }
        Outcome::Failure { .. } => "Gagal".to_string(),
    }
}

/// Result region for the latest outcome; empty when there is none
pub fn render_outcome(outcome: Option<&OutcomeRecord>) -> String {
    let Some(record) = outcome else {
        return String::new();
    };

    match &record.outcome {
        Outcome::Failure { message } => format!(
            r#"<div class="result result-error" role="alert" aria-live="polite">
    <p class="result-text">Terjadi kesalahan: {}</p>
</div>"#,
            escape_html(message)
        ),
        Outcome::Success(prediction) => {
            let percent = prediction.percent();
            format!(
                r#"<div class="result result-success" role="status" aria-live="polite">
    <p class="result-text">Bacaan terdeteksi: {} ({}%)</p>
    <div class="confidence-track"><div class="confidence-bar" style="width: {}%"></div></div>
</div>"#,
                escape_html(&prediction.label),
                percent,
                percent
            )
        }
    }
}

/// History card body, newest first
pub fn render_history(history: &History) -> String {
    if history.is_empty() {
        return r#"<p class="muted">Belum ada analisis. Unggah audio untuk mulai.</p>"#.to_string();
    }

    let items: String = history
        .iter()
        .map(|record| {
            let summary_class = if record.is_failure() {
                "history-failed"
            } else {
                "history-label"
            };
            format!(
                r#"
    <li class="history-item">
        <div class="history-meta">
            <p class="history-name">{}</p>
            <p class="history-time">{}</p>
        </div>
        <span class="{}">{}</span>
    </li>"#,
                escape_html(&record.name),
                format_timestamp(&record.at),
                summary_class,
                escape_html(&history_summary(record))
            )
        })
        .collect();

    format!(r#"<ul class="history-list">{}
</ul>"#, items)
}

fn audio_status(view: &SessionView) -> String {
    match (&view.audio_url, &view.file_name) {
        (Some(_), Some(name)) => format!("Siap diputar: {}", escape_html(name)),
        (Some(_), None) => "Audio siap diputar.".to_string(),
        (None, _) => "Unggah audio untuk melihat waveform.".to_string(),
    }
}

fn disabled(flag: bool) -> &'static str {
    if flag {
        " disabled"
    } else {
        ""
    }
}

/// Full analyzer page
pub fn render_page(view: &SessionView, notice: Option<&str>) -> String {
    let playing = view.playback == PlaybackState::Playing;
    let notice_html = notice
        .map(|message| {
            format!(
                r#"<div class="notice" role="alert" data-notice="{0}">{0}</div>"#,
                escape_html(message)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="id">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sistem Identifikasi Bacaan Qiraat</title>
    <style>
        * {{
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }}
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #f7f7f5;
            color: #1f2937;
            line-height: 1.6;
        }}
        header {{
            background-color: #064e3b;
            color: #ecfdf5;
            padding: 24px 20px;
        }}
        header h1 {{
            font-size: 26px;
        }}
        .subtitle {{
            opacity: 0.9;
        }}
        main {{
            max-width: 960px;
            margin: 0 auto;
            padding: 32px 20px;
        }}
        .card {{
            background: #fff;
            border: 1px solid #e5e7eb;
            border-radius: 12px;
            padding: 20px;
            margin-bottom: 20px;
        }}
        .actions {{
            display: flex;
            flex-wrap: wrap;
            gap: 12px;
            margin-bottom: 16px;
        }}
        .button {{
            display: inline-block;
            padding: 10px 20px;
            background: #10b981;
            color: #fff;
            border: none;
            border-radius: 6px;
            font-weight: 600;
            cursor: pointer;
        }}
        .button.outline {{
            background: #fff;
            color: #064e3b;
            border: 1px solid #10b981;
        }}
        .button:disabled {{
            opacity: 0.5;
            cursor: not-allowed;
        }}
        .visually-hidden {{
            position: absolute;
            width: 1px;
            height: 1px;
            overflow: hidden;
            clip: rect(0 0 0 0);
        }}
        .wave-box {{
            background: #f3f4f6;
            border-radius: 8px;
            padding: 16px;
        }}
        #waveform {{
            min-height: 96px;
            background: #e5e7eb;
            border-radius: 6px;
        }}
        .wave-controls {{
            display: flex;
            align-items: center;
            gap: 8px;
            margin-top: 12px;
        }}
        .muted {{
            color: #6b7280;
            font-size: 14px;
        }}
        .notice {{
            background: #fef3c7;
            border: 1px solid #f59e0b;
            border-radius: 8px;
            padding: 12px;
            margin-bottom: 16px;
        }}
        .result {{
            margin-top: 16px;
            border: 1px solid;
            border-radius: 8px;
            padding: 16px;
        }}
        .result-success {{
            background: #ecfdf5;
            border-color: #10b981;
        }}
        .result-error {{
            background: #fef2f2;
            border-color: #ef4444;
            color: #991b1b;
        }}
        .result-text {{
            font-weight: 600;
        }}
        .confidence-track {{
            margin-top: 8px;
            height: 8px;
            background: #e5e7eb;
            border-radius: 4px;
        }}
        .confidence-bar {{
            height: 8px;
            background: #10b981;
            border-radius: 4px;
        }}
        .history-list {{
            list-style: none;
            margin-top: 8px;
        }}
        .history-item {{
            display: flex;
            justify-content: space-between;
            gap: 12px;
            background: #f0fdf4;
            border-radius: 6px;
            padding: 8px 12px;
            margin-bottom: 8px;
        }}
        .history-name {{
            font-weight: 600;
            font-size: 14px;
        }}
        .history-time {{
            color: #6b7280;
            font-size: 12px;
        }}
        .history-failed {{
            color: #b91c1c;
        }}
        .history-label {{
            color: #047857;
        }}
        footer {{
            border-top: 1px solid #e5e7eb;
            padding: 24px;
            text-align: center;
            color: #6b7280;
            font-size: 14px;
        }}
    </style>
</head>
<body>
    <header>
        <h1>Sistem Identifikasi Bacaan Qiraat</h1>
        <p class="subtitle">Unggah rekaman bacaan Al-Qur’an dan identifikasi Qiraat secara otomatis.</p>
    </header>
    <main>
        <section class="card">
            <h2>Analisis Audio</h2>
            {notice}
            <div class="actions">
                <form id="upload-form" action="/audio" method="post" enctype="multipart/form-data">
                    <label for="file-input-audio" class="visually-hidden">Unggah berkas audio</label>
                    <input type="file" name="file" id="file-input-audio" accept="audio/*,.mp3,.wav">
                    <button type="submit" class="button">Unggah Audio</button>
                </form>
                <button type="button" class="button outline" id="record-button">Rekam</button>
                <form id="identify-form" action="/identify" method="post">
                    <button type="submit" class="button" id="identify-button"{identify_disabled}>{identify_label}</button>
                </form>
                <button type="button" class="button outline" id="end-session">Akhiri Sesi</button>
            </div>

            <div class="wave-box">
                <div id="waveform" data-audio-url="{audio_url}" aria-label="Visualisasi gelombang audio"></div>
                <div class="wave-controls">
                    <button type="button" class="button outline" id="play-toggle" aria-pressed="{playing}"{play_disabled}>{play_label}</button>
                    <p class="muted" id="audio-status">{audio_status}</p>
                </div>
            </div>

            {outcome}
        </section>

        <section class="card">
            <h3>Riwayat Analisis</h3>
            {history}
        </section>
    </main>
    <footer>Sistem Identifikasi Bacaan Qiraat | qiraat-ui v{version} [{git_hash}]</footer>
    <script src="{wavesurfer}"></script>
    <script src="/static/app.js"></script>
</body>
</html>
"#,
        notice = notice_html,
        identify_disabled = disabled(!view.has_audio() || view.busy),
        identify_label = if view.busy {
            "Mengidentifikasi..."
        } else {
            "Identifikasi"
        },
        audio_url = view.audio_url.as_deref().map(escape_html).unwrap_or_default(),
        playing = playing,
        play_disabled = disabled(!view.has_audio()),
        play_label = if playing { "Jeda" } else { "Putar" },
        audio_status = audio_status(view),
        outcome = render_outcome(view.outcome.as_ref()),
        history = render_history(&view.history),
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        wavesurfer = WAVESURFER_SCRIPT_URL,
    )
}
