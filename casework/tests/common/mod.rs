use casework::State;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ListState {
    pub items: Vec<String>,
    pub loads: u64,
}

impl State for ListState {}

impl ListState {
    pub fn loaded(self, items: Vec<String>) -> Self {
        ListState {
            items,
            loads: self.loads + 1,
        }
    }
}
