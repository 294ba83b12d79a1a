// state local to tui: the bpm field while it's being typed into
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub bpm_entry: Option<String>, // Some while typing, holds the digits so far
}

impl TuiState {
    pub fn editing_bpm(&self) -> bool {
        self.bpm_entry.is_some()
    }
}
