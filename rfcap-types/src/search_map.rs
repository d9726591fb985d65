/// Ёмкость карты поиска дронов в заголовке версии 5.
pub const MAX_DRONE_SEARCH_MAP_LEN: usize = 10;

/// Запись карты поиска: тип дрона и один канал.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchMapEntry {
    pub dr_type: u32,
    /// Слот, в котором записывающая сторона хранит число каналов (сейчас 1)
    pub reserved: u32,
    pub chan_list: [u32; 1],
}

/// Карта поиска дронов (режим слежения, версия 5).
///
/// Всегда содержит [`MAX_DRONE_SEARCH_MAP_LEN`] записей; `declared_len`
/// носит информационный характер.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroneSearchMap {
    pub declared_len: u32,
    pub entries: [SearchMapEntry; MAX_DRONE_SEARCH_MAP_LEN],
}

impl DroneSearchMap {
    /// Нулевая карта (31 нулевое слово на диске).
    pub fn placeholder() -> Self {
        Self {
            declared_len: 0,
            entries: [SearchMapEntry::default(); MAX_DRONE_SEARCH_MAP_LEN],
        }
    }

    /// Первые `min(declared_len, 10)` записей.
    pub fn active_entries(&self) -> &[SearchMapEntry] {
        let n = (self.declared_len as usize).min(MAX_DRONE_SEARCH_MAP_LEN);
        &self.entries[..n]
    }
}

impl Default for DroneSearchMap {
    fn default() -> Self {
        Self::placeholder()
    }
}
