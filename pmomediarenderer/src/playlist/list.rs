use thiserror::Error;
use tracing::trace;

/// Erreurs des opérations de playlist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaylistError {
    #[error("Unknown entry id {0} to insert after")]
    InvalidAfterId(u32),

    #[error("Unknown entry id {0}")]
    InvalidId(u32),

    #[error("Index {0} is outside the playlist")]
    InvalidIndex(usize),

    #[error("Playlist is full ({0} entries)")]
    Full(usize),
}

/// Une entrée de playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub id: u32,
    pub uri: String,
    pub metadata: String,
}

/// Évènement émis vers les listeners de la playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistEvent {
    /// La liste a changé de structure (insertion, suppression, vidage).
    ListChanged,
    /// L'entrée courante vient d'être supprimée.
    CurrentRemoved,
    /// L'entrée courante a changé. `automatic` distingue l'enchaînement en
    /// fin de piste d'un changement demandé.
    CurrentChanged { id: Option<u32>, automatic: bool },
}

pub type PlaylistListener = Box<dyn Fn(&PlaylistEvent) + Send + Sync>;

/// Liste ordonnée de pistes avec un curseur.
///
/// Les identifiants commencent à 1, ne sont jamais réutilisés, et `0`
/// désigne la tête de liste. Le `token` augmente à chaque modification de
/// structure.
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
    next_id: u32,
    current: Option<usize>,
    next: Option<usize>,
    token: u32,
    repeat: bool,
    tracks_max: usize,
    listeners: Vec<PlaylistListener>,
}

impl std::fmt::Debug for Playlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playlist")
            .field("ids", &self.ids())
            .field("current", &self.current)
            .field("next", &self.next)
            .field("token", &self.token)
            .field("repeat", &self.repeat)
            .finish()
    }
}

impl Playlist {
    pub fn new(tracks_max: usize) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            current: None,
            next: None,
            token: 0,
            repeat: false,
            tracks_max,
            listeners: Vec::new(),
        }
    }

    pub fn register_listener<F>(&mut self, listener: F)
    where
        F: Fn(&PlaylistEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn fire(&self, event: PlaylistEvent) {
        trace!("📋 Playlist event {:?}", event);
        for listener in &self.listeners {
            listener(&event);
        }
    }

    fn fire_current_changed(&self, automatic: bool) {
        self.fire(PlaylistEvent::CurrentChanged {
            id: self.current_id(),
            automatic,
        });
    }

    fn recompute_next(&mut self) {
        self.next = match self.current {
            None => None,
            Some(i) if i + 1 < self.entries.len() => Some(i + 1),
            Some(_) if self.repeat && !self.entries.is_empty() => Some(0),
            Some(_) => None,
        };
    }

    fn index_of(&self, id: u32) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn token(&self) -> u32 {
        self.token
    }

    pub fn tracks_max(&self) -> usize {
        self.tracks_max
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn ids(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn get(&self, id: u32) -> Option<&PlaylistEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&PlaylistEntry> {
        self.current.map(|i| &self.entries[i])
    }

    pub fn current_id(&self) -> Option<u32> {
        self.current().map(|e| e.id)
    }

    /// Entrée qui suivra la courante.
    pub fn next_entry(&self) -> Option<&PlaylistEntry> {
        self.next.map(|i| &self.entries[i])
    }

    /// Insère une entrée après `after_id` (`0` pour la tête).
    ///
    /// # Returns
    ///
    /// L'identifiant alloué.
    pub fn insert(&mut self, after_id: u32, uri: &str, metadata: &str) -> Result<u32, PlaylistError> {
        if self.entries.len() >= self.tracks_max {
            return Err(PlaylistError::Full(self.tracks_max));
        }
        let position = if after_id == 0 {
            0
        } else {
            self.index_of(after_id)
                .ok_or(PlaylistError::InvalidAfterId(after_id))?
                + 1
        };

        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(
            position,
            PlaylistEntry {
                id,
                uri: uri.to_string(),
                metadata: metadata.to_string(),
            },
        );
        if let Some(current) = self.current {
            if current >= position {
                self.current = Some(current + 1);
            }
        }
        self.token += 1;

        self.fire(PlaylistEvent::ListChanged);
        if self.current.is_none() {
            self.fire_current_changed(false);
        }
        self.recompute_next();
        Ok(id)
    }

    /// Supprime l'entrée `id`.
    ///
    /// Si c'était l'entrée courante, la sélection passe à la première entrée
    /// restante (ou à aucune).
    pub fn remove(&mut self, id: u32) -> Result<(), PlaylistError> {
        let index = self.index_of(id).ok_or(PlaylistError::InvalidId(id))?;
        self.entries.remove(index);
        self.token += 1;
        self.fire(PlaylistEvent::ListChanged);

        match self.current {
            Some(current) if current == index => {
                self.current = if self.entries.is_empty() { None } else { Some(0) };
                self.fire(PlaylistEvent::CurrentRemoved);
                self.fire_current_changed(false);
            }
            Some(current) if current > index => {
                self.current = Some(current - 1);
            }
            _ => {}
        }

        self.recompute_next();
        Ok(())
    }

    /// Vide la playlist.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.token += 1;
        self.next = None;
        if self.current.take().is_some() {
            self.fire(PlaylistEvent::ListChanged);
            self.fire(PlaylistEvent::CurrentRemoved);
            self.fire_current_changed(false);
        }
    }

    /// Avance sur l'entrée suivante.
    ///
    /// # Returns
    ///
    /// `false` s'il n'y a pas d'entrée suivante.
    pub fn next(&mut self, automatic: bool) -> bool {
        let Some(next) = self.next else {
            return false;
        };
        self.current = Some(next);
        self.fire_current_changed(automatic);
        self.recompute_next();
        true
    }

    /// Recule sur l'entrée précédente (la dernière en mode repeat).
    pub fn previous(&mut self) -> bool {
        let target = match self.current {
            Some(i) if i > 0 => i - 1,
            Some(_) if self.repeat => self.entries.len() - 1,
            _ => return false,
        };
        self.current = Some(target);
        self.fire_current_changed(false);
        self.recompute_next();
        true
    }

    pub fn seek_id(&mut self, id: u32) -> Result<(), PlaylistError> {
        let index = self.index_of(id).ok_or(PlaylistError::InvalidId(id))?;
        self.seek_index(index)
    }

    pub fn seek_index(&mut self, index: usize) -> Result<(), PlaylistError> {
        if index >= self.entries.len() {
            return Err(PlaylistError::InvalidIndex(index));
        }
        self.current = Some(index);
        self.fire_current_changed(false);
        self.recompute_next();
        Ok(())
    }

    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
        self.recompute_next();
    }
}
