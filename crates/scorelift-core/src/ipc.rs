use scorelift_ports::types::{ConversionMode, ConversionRequest, ConversionResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    Convert { request: ConversionRequest },
    RenderScore { xml_path: String, output_dir: String },
    ExportDiagnostics { path: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    ConversionStarted {
        input_path: String,
        output_dir: String,
        mode: ConversionMode,
    },
    ConversionFinished { result: ConversionResult },
    ScoreRendered { xml_path: String, pdf_path: String },
    DiagnosticsExported { path: String },
}
