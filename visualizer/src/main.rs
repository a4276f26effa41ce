use charts::{bar_color, ClassBars, FrameSeries};
use framescope::aggregation::{AggregateStats, ClassNameTable};
use framescope::prelude::{ClientConfig, TransferProgress, TransferResult, DEFAULT_ENDPOINT};
use framescope::service_interface::DetectionResponse;
use framescope::session::{
    Resolution, SessionSnapshot, TransferTicket, UploadController, UploadStatus, VideoFile,
    VideoFormat,
};
use framescope::transport::{drive_transfer, HttpTransport};
use iced::{
    futures::{channel::mpsc, SinkExt, Stream},
    widget::{
        button, canvas::Canvas, column, progress_bar, row, scrollable, text, text_input, Column,
        Container,
    },
    Alignment, Element, Length, Task, Theme,
};
use std::{env, sync::Arc};

mod charts;

const ENDPOINT_VAR: &str = "FRAMESCOPE_ENDPOINT";
const NO_DATA: &str = "No detection data available. Try uploading a video first.";

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Framescope".into()
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

fn endpoint_from(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

fn picker_hint() -> String {
    let extensions: Vec<String> = VideoFormat::SUPPORTED
        .iter()
        .map(|format| format!(".{}", format.extension()))
        .collect();
    format!("Path to a video ({})", extensions.join(", "))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Upload,
    Details,
}

struct Visualizer {
    controller: UploadController,
    transport: Option<Arc<HttpTransport>>,
    class_table: ClassNameTable,
    path_input: String,
    picker_hint: String,
    notice: Option<String>,
    screen: Screen,
}

#[derive(Debug, Clone)]
enum TransferEvent {
    Progress(u64, TransferProgress),
    Finished(u64, TransferResult<DetectionResponse>),
}

#[derive(Debug, Clone)]
enum Message {
    PathChanged(String),
    SelectFile,
    Submit,
    Transfer(TransferEvent),
    ShowUpload,
    ShowDetails,
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        let config = ClientConfig::with_endpoint(endpoint_from(env::var(ENDPOINT_VAR).ok()));
        let (transport, notice) = match HttpTransport::new(&config) {
            Ok(transport) => {
                log::info!("sending uploads to {}", transport.endpoint());
                (Some(Arc::new(transport)), None)
            }
            Err(err) => {
                log::error!("cannot build HTTP transport: {err}");
                (None, Some(format!("Transport unavailable: {err}")))
            }
        };

        (
            Visualizer {
                controller: UploadController::new(),
                transport,
                class_table: config.class_table(),
                path_input: String::new(),
                picker_hint: picker_hint(),
                notice,
                screen: Screen::Upload,
            },
            Task::none(),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::PathChanged(value) => {
                state.path_input = value;
                Task::none()
            }
            Message::SelectFile => {
                match VideoFile::from_path(state.path_input.trim()) {
                    Ok(file) => {
                        state.controller.select_file(file);
                        state.notice = None;
                    }
                    Err(err) => {
                        log::warn!("rejected selection {:?}: {err}", state.path_input);
                        state.notice = Some(format!("Cannot select file: {err}"));
                    }
                }
                Task::none()
            }
            Message::Submit => {
                let Some(transport) = state.transport.clone() else {
                    return Task::none();
                };
                match state.controller.begin_submit() {
                    Ok(ticket) => Task::run(transfer_events(transport, ticket), Message::Transfer),
                    Err(err) => {
                        state.notice = Some(err.to_string());
                        Task::none()
                    }
                }
            }
            Message::Transfer(TransferEvent::Progress(sequence, progress)) => {
                state.controller.record_progress(sequence, progress);
                Task::none()
            }
            Message::Transfer(TransferEvent::Finished(sequence, outcome)) => {
                if state.controller.resolve(sequence, outcome) == Resolution::Stale {
                    log::debug!("dropped superseded transfer #{sequence}");
                }
                Task::none()
            }
            Message::ShowUpload => {
                state.screen = Screen::Upload;
                Task::none()
            }
            Message::ShowDetails => {
                state.screen = Screen::Details;
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let nav = row![
            button("Upload")
                .on_press_maybe((state.screen != Screen::Upload).then_some(Message::ShowUpload))
                .padding(8),
            button("Details")
                .on_press_maybe((state.screen != Screen::Details).then_some(Message::ShowDetails))
                .padding(8),
        ]
        .spacing(10);

        let body = match state.screen {
            Screen::Upload => state.upload_view(),
            Screen::Details => state.details_view(),
        };

        Container::new(column![nav, body].spacing(16).padding(20))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn upload_view(&self) -> Element<'_, Message> {
        let snapshot = self.controller.snapshot();

        let picker = row![
            text_input(&self.picker_hint, &self.path_input)
                .on_input(Message::PathChanged)
                .on_submit(Message::SelectFile)
                .padding(6),
            button("Select").on_press(Message::SelectFile).padding(8),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let video_info = match &snapshot.video {
            Some(video) => column![
                text(format!("Name: {}", video.name)).size(14),
                text(format!("Size: {}", video.size_label)).size(14),
                text(format!("Type: {}", video.media_type)).size(14),
                text(format!("Preview: {}", video.preview_uri)).size(12),
            ]
            .spacing(4),
            None => column![text("No video selected").size(14)],
        };

        let mut content = column![
            text("Upload Video").size(26),
            picker,
            Container::new(video_info).padding(6),
        ]
        .spacing(12)
        .width(Length::Fixed(520.0));

        if snapshot.status == UploadStatus::Uploading {
            content = content.push(
                row![
                    progress_bar(0.0..=100.0, f32::from(snapshot.progress_percent)),
                    text(format!("{}%", snapshot.progress_percent)).size(14),
                ]
                .spacing(10)
                .align_y(Alignment::Center),
            );
        }

        content = content.push(
            button("Detect")
                .on_press_maybe(
                    (snapshot.can_submit() && self.transport.is_some()).then_some(Message::Submit),
                )
                .padding(10),
        );

        if !snapshot.result_summary.is_empty() {
            content = content.push(text(snapshot.result_summary.clone()).size(16));
        }
        if let Some(notice) = &self.notice {
            content = content.push(text(notice.clone()).size(14));
        }

        content.push(metrics_panel(&snapshot)).into()
    }

    fn details_view(&self) -> Element<'_, Message> {
        let stats = self.controller.store().snapshot().aggregate(&self.class_table);
        let Ok(stats) = stats else {
            return column![text("Detection Details").size(26), text(NO_DATA).size(16)]
                .spacing(12)
                .into();
        };

        let legend = stats.class_frequency.iter().enumerate().fold(
            Column::new().spacing(4),
            |col, (idx, (label, count))| {
                col.push(
                    text(format!("{label}: {count}"))
                        .size(12)
                        .color(bar_color(idx)),
                )
            },
        );

        let bars = Canvas::new(ClassBars::new(&stats))
            .width(Length::Fill)
            .height(Length::Fixed(220.0));
        let series = Canvas::new(FrameSeries::new(&stats.per_frame_series))
            .width(Length::Fill)
            .height(Length::Fixed(220.0));

        let summary = summary_lines(&stats)
            .into_iter()
            .fold(Column::new().spacing(4), |col, line| col.push(text(line).size(14)));

        let charts = column![
            text("Detection Details").size(26),
            text("Class frequency").size(18),
            row![bars, scrollable(legend).height(Length::Fixed(220.0))].spacing(12),
            text(format!(
                "Detections per frame (peak {})",
                stats.peak_frame_count()
            ))
            .size(18),
            series,
            text("Summary").size(18),
            Container::new(summary).padding(6),
        ]
        .spacing(10)
        .width(Length::Fill);

        scrollable(charts).into()
    }
}

fn metrics_panel(snapshot: &SessionSnapshot) -> Element<'static, Message> {
    column![
        text("Metrics").size(18),
        text(format!("Accuracy: {}", snapshot.accuracy_label())).size(14),
        text(format!("False positives: {}", snapshot.false_positives_label())).size(14),
        text(format!("Accuracy gain: {}", snapshot.accuracy_gain_label())).size(14),
    ]
    .spacing(4)
    .into()
}

fn summary_lines(stats: &AggregateStats) -> Vec<String> {
    let average = stats
        .average_confidence
        .map(|avg| format!("{avg:.2}"))
        .unwrap_or_else(|| "N/A".into());
    vec![
        format!("Total detections: {}", stats.total_detections),
        format!("Average confidence: {average}"),
        format!("Frames analyzed: {}", stats.frames_analyzed),
    ]
}

/// Runs the transfer behind `ticket`, emitting progress and the final outcome
/// tagged with the ticket's sequence number.
fn transfer_events(
    transport: Arc<HttpTransport>,
    ticket: TransferTicket,
) -> impl Stream<Item = TransferEvent> {
    let sequence = ticket.sequence;
    iced::stream::channel(100, move |mut output: mpsc::Sender<TransferEvent>| async move {
        let outcome = drive_transfer(transport.as_ref(), ticket.request, |progress| {
            // A full buffer only drops an intermediate report.
            let _ = output.try_send(TransferEvent::Progress(sequence, progress));
        })
        .await;
        let _ = output.send(TransferEvent::Finished(sequence, outcome)).await;
    })
}
