use crate::models::{Deteccion, EventoActividad, VehiculoActivo, VehiculoHistorial};
use crate::utils::clave_fecha;
use std::sync::Mutex;

/// Cuántos eventos conserva el feed de actividad reciente
pub const MAX_RECIENTES: usize = 3;

/// Eventos llegados por el stream o generados por salidas locales,
/// acotados al tamaño del feed. Las pantallas los combinan con los
/// eventos derivados de los tickets consultados.
pub struct FeedActividad {
    eventos: Mutex<Vec<EventoActividad>>,
}

impl FeedActividad {
    pub fn new() -> Self {
        FeedActividad {
            eventos: Mutex::new(Vec::new()),
        }
    }

    /// Pliega un evento dentro del feed acotado
    pub fn registrar(&self, evento: EventoActividad) {
        if let Ok(mut eventos) = self.eventos.lock() {
            let actual = std::mem::take(&mut *eventos);
            *eventos = combinar_evento(actual, evento);
        }
    }

    pub fn instantanea(&self) -> Vec<EventoActividad> {
        self.eventos.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn vaciar(&self) {
        if let Ok(mut eventos) = self.eventos.lock() {
            eventos.clear();
        }
    }
}

/// Inserta un evento, reordena descendente por fecha y recorta al tope.
/// Con fechas iguales el orden de llegada se conserva (orden estable).
pub fn combinar_evento(
    mut lista: Vec<EventoActividad>,
    evento: EventoActividad,
) -> Vec<EventoActividad> {
    lista.push(evento);
    ordenar_descendente(&mut lista);
    lista.truncate(MAX_RECIENTES);
    lista
}

/// Orden estable, más reciente primero
pub fn ordenar_descendente(eventos: &mut [EventoActividad]) {
    eventos.sort_by_key(|e| std::cmp::Reverse(clave_fecha(&e.created_at)));
}

/// Evento de entrada para un vehículo activo
pub fn evento_de_entrada(v: &VehiculoActivo) -> EventoActividad {
    EventoActividad {
        id: format!("entrada-{}", v.id),
        tipo: "entrada".to_string(),
        descripcion: format!("Vehículo {} ingresó al parqueadero", v.placa),
        created_at: v.fecha_entrada.clone(),
    }
}

/// Evento de salida para un vehículo del historial
pub fn evento_de_salida(v: &VehiculoHistorial) -> EventoActividad {
    EventoActividad {
        id: format!("salida-{}", v.id),
        tipo: "salida".to_string(),
        descripcion: format!("Vehículo {} salió del parqueadero", v.placa),
        created_at: v.fecha_salida.clone(),
    }
}

/// Evento de feed para una detección del stream
pub fn evento_de_deteccion(deteccion: &Deteccion) -> EventoActividad {
    EventoActividad {
        id: format!("deteccion-{}-{}", deteccion.placa, deteccion.timestamp),
        tipo: "entrada".to_string(),
        descripcion: format!("Vehículo {} detectado en la entrada", deteccion.placa),
        created_at: deteccion.timestamp.clone(),
    }
}

/// Eventos de actividad derivados de los tickets consultados
pub fn eventos_de_vehiculos(
    activos: &[VehiculoActivo],
    historial: &[VehiculoHistorial],
) -> Vec<EventoActividad> {
    let mut eventos: Vec<EventoActividad> = activos.iter().map(evento_de_entrada).collect();
    eventos.extend(historial.iter().map(evento_de_salida));
    eventos
}

/// Feed combinado: eventos de tickets más los empujados, acotado al tope
pub fn feed_reciente(
    de_tickets: Vec<EventoActividad>,
    empujados: &[EventoActividad],
) -> Vec<EventoActividad> {
    let mut todos = de_tickets;
    todos.extend(empujados.iter().cloned());
    ordenar_descendente(&mut todos);
    todos.truncate(MAX_RECIENTES);
    todos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evento(id: &str, created_at: &str) -> EventoActividad {
        EventoActividad {
            id: id.to_string(),
            tipo: "entrada".to_string(),
            descripcion: format!("Vehículo {} ingresó al parqueadero", id),
            created_at: created_at.to_string(),
        }
    }

    fn ids(eventos: &[EventoActividad]) -> Vec<&str> {
        eventos.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn el_feed_nunca_pasa_del_tope() {
        let mut feed = Vec::new();
        for i in 0..10 {
            let fecha = format!("2026-03-10T08:0{}:00Z", i % 10);
            feed = combinar_evento(feed, evento(&format!("e{}", i), &fecha));
            assert!(feed.len() <= MAX_RECIENTES);
        }
        assert_eq!(feed.len(), MAX_RECIENTES);
    }

    #[test]
    fn queda_ordenado_del_mas_reciente_al_mas_viejo() {
        let mut feed = Vec::new();
        feed = combinar_evento(feed, evento("viejo", "2026-03-10T08:00:00Z"));
        feed = combinar_evento(feed, evento("nuevo", "2026-03-10T10:00:00Z"));
        feed = combinar_evento(feed, evento("medio", "2026-03-10T09:00:00Z"));
        assert_eq!(ids(&feed), ["nuevo", "medio", "viejo"]);
    }

    #[test]
    fn un_evento_viejo_no_desplaza_a_los_recientes() {
        let mut feed = Vec::new();
        feed = combinar_evento(feed, evento("a", "2026-03-10T10:00:00Z"));
        feed = combinar_evento(feed, evento("b", "2026-03-10T11:00:00Z"));
        feed = combinar_evento(feed, evento("c", "2026-03-10T12:00:00Z"));
        feed = combinar_evento(feed, evento("antiguo", "2026-03-09T12:00:00Z"));
        assert_eq!(ids(&feed), ["c", "b", "a"]);
    }

    #[test]
    fn fechas_iguales_conservan_el_orden_de_llegada() {
        let mut feed = Vec::new();
        feed = combinar_evento(feed, evento("primero", "2026-03-10T10:00:00Z"));
        feed = combinar_evento(feed, evento("segundo", "2026-03-10T10:00:00Z"));
        feed = combinar_evento(feed, evento("tercero", "2026-03-10T10:00:00Z"));
        assert_eq!(ids(&feed), ["primero", "segundo", "tercero"]);
    }

    #[test]
    fn mapea_tickets_a_eventos_con_descripcion() {
        let activos = vec![VehiculoActivo {
            id: 5,
            placa: "ABC123".to_string(),
            fecha_entrada: "2026-03-10T08:00:00Z".to_string(),
            espacio: None,
            turno_id: Some(1),
        }];
        let historial = vec![VehiculoHistorial {
            id: 4,
            placa: "XYZ987".to_string(),
            fecha_entrada: "2026-03-10T07:00:00Z".to_string(),
            fecha_salida: "2026-03-10T09:30:00Z".to_string(),
            total_facturado: 15000.0,
            turno_id: Some(1),
        }];

        let eventos = eventos_de_vehiculos(&activos, &historial);
        assert_eq!(eventos.len(), 2);
        assert_eq!(eventos[0].id, "entrada-5");
        assert_eq!(eventos[0].descripcion, "Vehículo ABC123 ingresó al parqueadero");
        assert_eq!(eventos[1].id, "salida-4");
        assert_eq!(eventos[1].descripcion, "Vehículo XYZ987 salió del parqueadero");
        assert_eq!(eventos[1].tipo, "salida");
    }

    #[test]
    fn una_salida_entra_al_feed_dentro_del_tope() {
        let feed = FeedActividad::new();
        feed.registrar(evento("e1", "2026-03-10T08:00:00Z"));
        feed.registrar(evento("e2", "2026-03-10T09:00:00Z"));
        feed.registrar(evento("e3", "2026-03-10T10:00:00Z"));

        let salida = EventoActividad {
            id: "salida-9".to_string(),
            tipo: "salida".to_string(),
            descripcion: "Vehículo ABC123 salió del parqueadero".to_string(),
            created_at: "2026-03-10T10:30:00Z".to_string(),
        };
        feed.registrar(salida);

        let eventos = feed.instantanea();
        assert_eq!(eventos.len(), MAX_RECIENTES);
        assert_eq!(eventos[0].id, "salida-9");
    }

    #[test]
    fn combina_tickets_con_eventos_empujados() {
        let de_tickets = vec![
            evento("entrada-1", "2026-03-10T08:00:00Z"),
            evento("entrada-2", "2026-03-10T09:00:00Z"),
        ];
        let empujados = vec![evento("deteccion-x", "2026-03-10T09:30:00Z")];

        let feed = feed_reciente(de_tickets, &empujados);
        assert_eq!(ids(&feed), ["deteccion-x", "entrada-2", "entrada-1"]);
    }
}
